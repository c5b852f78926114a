//! HTTP download of repository artifacts with progress reporting and SHA-256 hashing.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::UtilError;

/// Download `url` to `dest`, showing progress on stderr and computing SHA-256.
///
/// Returns the hex-encoded SHA-256 hash of the downloaded content. The request is
/// attempted once; HTTP error statuses (e.g. 404 for an unknown coordinate) are errors.
///
/// # Errors
/// Returns an error if the HTTP request fails, the file cannot be written,
/// or a read error occurs during streaming.
pub fn download_with_progress(url: &str, dest: &Path, label: &str) -> Result<String, UtilError> {
    tracing::debug!(url, dest = %dest.display(), "downloading artifact");

    let agent = ureq::Agent::new_with_config(
        ureq::config::Config::builder()
            .timeout_connect(Some(std::time::Duration::from_secs(30)))
            .timeout_global(Some(std::time::Duration::from_secs(600)))
            .build(),
    );

    let response = agent.get(url).call().map_err(|e| UtilError::Download {
        message: format!("{url}: {e}"),
    })?;

    let content_length: Option<u64> = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok());

    let mut body = response.into_body();
    let mut reader = body.as_reader();
    let mut file = std::fs::File::create(dest).map_err(|source| UtilError::Io {
        path: dest.display().to_string(),
        source,
    })?;

    let mut hasher = Sha256::new();
    let mut downloaded: u64 = 0;
    let mut last_pct: u64 = 0;
    let mut buf = vec![0u8; 64 * 1024];

    loop {
        let n = std::io::Read::read(&mut reader, &mut buf).map_err(|e| UtilError::Download {
            message: e.to_string(),
        })?;
        if n == 0 {
            break;
        }

        let Some(chunk) = buf.get(..n) else {
            break;
        };
        std::io::Write::write_all(&mut file, chunk).map_err(|source| UtilError::Io {
            path: dest.display().to_string(),
            source,
        })?;
        hasher.update(chunk);

        downloaded = downloaded.saturating_add(n as u64);

        if let Some(total) = content_length.filter(|t| *t > 0) {
            let pct = downloaded.saturating_mul(100) / total;
            if pct != last_pct && pct % 10 == 0 {
                eprint!("\r    Downloading {label}... {pct}%");
                last_pct = pct;
            }
        }
    }

    if content_length.is_some() {
        eprintln!("\r    Downloading {label}... done   ");
    } else {
        let kb = downloaded / 1024;
        eprintln!("    Downloaded {label} ({kb} KB)");
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn download_unreachable_host_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("client.jar");
        let result = download_with_progress("http://127.0.0.1:1/client.jar", &dest, "client");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("download failed"), "error was: {err}");
        assert!(err.contains("127.0.0.1:1"), "error was: {err}");
    }
}
