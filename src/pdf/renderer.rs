use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use log::{debug, info};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::core::config::RendererConfig;
use crate::invoicing::InvoicingError;

#[cfg(windows)]
const BINARY_NAME: &str = "wkhtmltopdf.exe";
#[cfg(not(windows))]
const BINARY_NAME: &str = "wkhtmltopdf";

#[cfg(windows)]
const PLATFORM_DEFAULT: &str = r"C:\Program Files\wkhtmltopdf\bin\wkhtmltopdf.exe";
#[cfg(not(windows))]
const PLATFORM_DEFAULT: &str = "/usr/local/bin/wkhtmltopdf";

/// Delay given to page scripts before a download is rendered.
pub const DOWNLOAD_JS_DELAY_MS: u32 = 10;
/// Delay used for the copy that is persisted and mailed.
pub const EMAIL_JS_DELAY_MS: u32 = 1000;

/// Finds the `wkhtmltopdf` executable: configured path, then `PATH`, then
/// the platform's usual install location.
#[derive(Debug, Clone)]
pub struct RendererLocator {
    configured: Option<PathBuf>,
    search_path: Option<OsString>,
    platform_default: Option<PathBuf>,
}

impl RendererLocator {
    pub fn new(
        configured: Option<PathBuf>,
        search_path: Option<OsString>,
        platform_default: Option<PathBuf>,
    ) -> Self {
        Self {
            configured,
            search_path,
            platform_default,
        }
    }

    pub fn from_config(config: &RendererConfig) -> Self {
        Self::new(
            config.wkhtmltopdf_cmd.clone(),
            std::env::var_os("PATH"),
            Some(PathBuf::from(PLATFORM_DEFAULT)),
        )
    }

    /// A locator that never finds anything.
    pub fn none() -> Self {
        Self::new(None, None, None)
    }

    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(path) = &self.configured {
            if path.exists() {
                return Some(path.clone());
            }
            debug!("Configured renderer {} does not exist", path.display());
        }

        if let Some(search_path) = &self.search_path {
            let found = std::env::split_paths(search_path)
                .map(|dir| dir.join(BINARY_NAME))
                .find(|candidate| candidate.is_file());
            if found.is_some() {
                return found;
            }
        }

        self.platform_default
            .as_ref()
            .filter(|path| path.exists())
            .cloned()
    }

    pub fn renderer(&self) -> Result<PdfRenderer, InvoicingError> {
        self.locate()
            .map(PdfRenderer::new)
            .ok_or(InvoicingError::RendererMissing)
    }
}

/// Command-line arguments for one conversion. HTML is read from stdin and
/// written to `output` (`-` for stdout).
pub fn render_args(javascript_delay_ms: u32, output: &OsStr) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "--quiet",
        "--encoding",
        "UTF-8",
        "--javascript-delay",
    ]
    .iter()
    .map(|a| OsString::from(*a))
    .collect();
    args.push(javascript_delay_ms.to_string().into());
    args.extend(
        [
            "--enable-local-file-access",
            "--page-size",
            "A4",
            "--custom-header",
            "Accept-Encoding",
            "gzip",
            "-",
        ]
        .iter()
        .map(|a| OsString::from(*a)),
    );
    args.push(output.to_os_string());
    args
}

#[derive(Debug, Clone)]
pub struct PdfRenderer {
    binary: PathBuf,
}

impl PdfRenderer {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Render to memory, for inline downloads.
    pub async fn render_to_bytes(
        &self,
        html: &str,
        javascript_delay_ms: u32,
    ) -> Result<Vec<u8>, InvoicingError> {
        let stdout = self
            .run(html, render_args(javascript_delay_ms, OsStr::new("-")))
            .await?;
        if stdout.is_empty() {
            return Err(InvoicingError::Renderer(
                "renderer produced no output".to_string(),
            ));
        }
        Ok(stdout)
    }

    /// Render straight into `output`, creating its directory when needed.
    pub async fn render_to_file(
        &self,
        html: &str,
        javascript_delay_ms: u32,
        output: &Path,
    ) -> Result<(), InvoicingError> {
        if let Some(dir) = output.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                InvoicingError::Internal(format!("Failed to create {}: {e}", dir.display()))
            })?;
        }
        match tokio::fs::remove_file(output).await {
            Ok(()) => debug!("Removed previous {}", output.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(InvoicingError::Internal(format!(
                    "Failed to replace {}: {e}",
                    output.display()
                )))
            }
        }

        self.run(html, render_args(javascript_delay_ms, output.as_os_str()))
            .await?;

        if !output.exists() {
            return Err(InvoicingError::Renderer(format!(
                "renderer did not create {}",
                output.display()
            )));
        }
        info!("Rendered invoice PDF to {}", output.display());
        Ok(())
    }

    async fn run(&self, html: &str, args: Vec<OsString>) -> Result<Vec<u8>, InvoicingError> {
        debug!("Running {} {:?}", self.binary.display(), args);

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                InvoicingError::Renderer(format!(
                    "failed to start {}: {e}",
                    self.binary.display()
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| InvoicingError::Internal("renderer stdin unavailable".to_string()))?;
        let input = html.as_bytes().to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| InvoicingError::Renderer(e.to_string()))?;

        if let Ok(Err(e)) = writer.await {
            debug!("Renderer closed stdin early: {e}");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(InvoicingError::Renderer(if stderr.is_empty() {
                format!("renderer exited with {}", output.status)
            } else {
                stderr
            }));
        }

        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_for_stdout() {
        let args = render_args(10, OsStr::new("-"));
        let args: Vec<&str> = args.iter().filter_map(|a| a.to_str()).collect();
        assert_eq!(
            args,
            vec![
                "--quiet",
                "--encoding",
                "UTF-8",
                "--javascript-delay",
                "10",
                "--enable-local-file-access",
                "--page-size",
                "A4",
                "--custom-header",
                "Accept-Encoding",
                "gzip",
                "-",
                "-",
            ]
        );
    }

    #[test]
    fn test_args_for_file() {
        let args = render_args(EMAIL_JS_DELAY_MS, OsStr::new("/tmp/out.pdf"));
        assert_eq!(args[4], OsString::from("1000"));
        assert_eq!(args.last(), Some(&OsString::from("/tmp/out.pdf")));
    }

    #[test]
    fn test_nothing_found() {
        assert!(RendererLocator::none().locate().is_none());
        assert!(matches!(
            RendererLocator::none().renderer(),
            Err(InvoicingError::RendererMissing)
        ));
    }

    #[test]
    fn test_missing_configured_and_default_paths_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let locator = RendererLocator::new(
            Some(dir.path().join("nope")),
            Some(OsString::from(dir.path())),
            Some(dir.path().join("also-missing")),
        );
        assert!(locator.locate().is_none());
    }

    #[test]
    fn test_configured_path_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let configured = dir.path().join("custom-wk");
        std::fs::write(&configured, b"").expect("write");
        let on_path = dir.path().join("bin");
        std::fs::create_dir(&on_path).expect("mkdir");
        std::fs::write(on_path.join(BINARY_NAME), b"").expect("write");

        let locator = RendererLocator::new(
            Some(configured.clone()),
            Some(on_path.clone().into_os_string()),
            None,
        );
        assert_eq!(locator.locate(), Some(configured));

        let locator = RendererLocator::new(None, Some(on_path.clone().into_os_string()), None);
        assert_eq!(locator.locate(), Some(on_path.join(BINARY_NAME)));
    }

    #[test]
    fn test_platform_default_is_last_resort() {
        let dir = tempfile::tempdir().expect("tempdir");
        let default = dir.path().join("wk-default");
        std::fs::write(&default, b"").expect("write");
        let locator = RendererLocator::new(None, Some(OsString::new()), Some(default.clone()));
        assert_eq!(locator.locate(), Some(default));
    }

    #[cfg(unix)]
    fn fake_binary(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod");
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rendering_with_fake_binaries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = fake_binary(
            dir.path(),
            "good-wk",
            r#"for last; do :; done
cat > /dev/null
if [ "$last" = "-" ]; then printf '%%PDF-1.4 fake'; else printf '%%PDF-1.4 fake' > "$last"; fi"#,
        );
        let bad = fake_binary(
            dir.path(),
            "bad-wk",
            "cat > /dev/null\necho 'Exit with code 1 due to network error' >&2\nexit 3",
        );

        let renderer = PdfRenderer::new(good);
        let bytes = renderer
            .render_to_bytes("<html><body>hi</body></html>", DOWNLOAD_JS_DELAY_MS)
            .await
            .expect("render to bytes");
        assert!(bytes.starts_with(b"%PDF"));

        let out = dir.path().join("client_invoices").join("abc123.pdf");
        renderer
            .render_to_file("<html></html>", EMAIL_JS_DELAY_MS, &out)
            .await
            .expect("render to file");
        assert!(std::fs::read(&out).expect("read pdf").starts_with(b"%PDF"));

        let err = PdfRenderer::new(bad)
            .render_to_bytes("<html></html>", DOWNLOAD_JS_DELAY_MS)
            .await
            .expect_err("failing renderer");
        match err {
            InvoicingError::Renderer(msg) => assert!(msg.contains("network error")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stale_file_does_not_count_as_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let silent = fake_binary(dir.path(), "silent-wk", "cat > /dev/null
exit 0");

        let out = dir.path().join("client_invoices").join("abc123.pdf");
        std::fs::create_dir_all(out.parent().expect("parent")).expect("mkdir");
        std::fs::write(&out, b"%PDF-1.4 from an earlier email").expect("write stale");

        let err = PdfRenderer::new(silent)
            .render_to_file("<html></html>", EMAIL_JS_DELAY_MS, &out)
            .await
            .expect_err("nothing was rendered");
        assert!(matches!(err, InvoicingError::Renderer(_)));
        assert!(!out.exists());
    }
}
