//! `sdm download <url>` – resolve a catalog reference and download it.

use anyhow::{Context, Result};
use std::sync::Arc;

use sdm_core::catalog::spotify::{Credentials, SpotifyCatalog};
use sdm_core::catalog::CatalogService;
use sdm_core::config::SdmConfig;
use sdm_core::media::ffmpeg::Ffmpeg;
use sdm_core::media::http_image::HttpImageSource;
use sdm_core::media::ytdlp::YtDlp;
use sdm_core::pipeline::{Services, Workspace};
use sdm_core::session::Session;
use sdm_core::tag::id3v2::Id3Embedder;

pub async fn run_download(
    cfg: &SdmConfig,
    url: &str,
    redownload: bool,
    jobs: Option<usize>,
) -> Result<()> {
    let out_dir = std::env::current_dir().context("resolve current directory")?;
    let workspace = Workspace::new(out_dir, cfg);

    let catalog: Arc<dyn CatalogService> = Arc::new(SpotifyCatalog::new(Credentials {
        client_id: cfg.client_id.clone(),
        client_secret: cfg.client_secret.clone(),
    }));
    // One yt-dlp adapter serves both the locate and fetch seams.
    let ytdlp = Arc::new(YtDlp::default());
    let locator: Arc<dyn sdm_core::media::AudioLocator> = ytdlp.clone();
    let fetcher: Arc<dyn sdm_core::media::AudioFetcher> = ytdlp;
    let services = Arc::new(Services {
        locator,
        fetcher,
        transcoder: Arc::new(Ffmpeg::default()),
        images: Arc::new(HttpImageSource::new()),
        embedder: Arc::new(Id3Embedder),
    });

    // Progress lines from every pipeline funnel through one printer so
    // concurrent downloads don't interleave partial lines.
    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<String>(16);
    let printer = tokio::spawn(async move {
        while let Some(line) = progress_rx.recv().await {
            println!("{line}");
        }
    });

    let batch_size = jobs.unwrap_or(cfg.batch_size);
    let session = Session::start(catalog, services, workspace, batch_size, Some(progress_tx));
    let report = session.download(url, redownload).await?;
    drop(session);
    printer.await.context("progress printer join")?;

    if report.attempted == 0 {
        println!("Nothing to download.");
    } else if report.failed == 0 {
        println!("Done: {} track(s) downloaded.", report.succeeded);
    } else {
        println!(
            "Done: {} of {} track(s) downloaded, {} failed.",
            report.succeeded, report.attempted, report.failed
        );
    }
    Ok(())
}
