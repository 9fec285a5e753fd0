//! ID3v2.3 embedder: maps the tag set onto text, link, and picture frames.

use std::path::Path;

use async_trait::async_trait;
use id3::frame::{Content, Picture, PictureType};
use id3::{Frame, Tag, TagLike, Version};

use super::{TagEmbedder, TagError, TagSet};

pub struct Id3Embedder;

fn build_tag(tags: &TagSet) -> Tag {
    let mut tag = Tag::new();
    // ID3v2.3 multi-value convention for contributing artists.
    tag.set_artist(tags.artists.join("/"));
    tag.set_title(tags.title.clone());
    tag.set_album(tags.album.clone());
    tag.set_album_artist(tags.album_artist.clone());
    tag.set_track(tags.track_number);
    tag.set_disc(tags.disc_number);
    tag.set_duration(tags.duration_ms as u32);
    tag.set_year(tags.release.year);
    if let Some(month_day) = tags.release.month_day() {
        tag.add_frame(Frame::text("TDAT", month_day));
    }
    tag.add_frame(Frame::link("WOAF", tags.audio_url.clone()));
    tag.add_frame(Frame::link("WOAR", tags.artist_url.clone()));
    tag.add_frame(Frame::link("WOAS", tags.audio_url.clone()));
    tag.add_frame(Frame::with_content(
        "APIC",
        Content::Picture(Picture {
            mime_type: tags.artwork.mime_type.clone(),
            picture_type: PictureType::CoverFront,
            description: tags.artwork.description.clone(),
            data: tags.artwork.data.clone(),
        }),
    ));
    tag
}

#[async_trait]
impl TagEmbedder for Id3Embedder {
    async fn embed(&self, staging: &Path, dest: &Path, tags: &TagSet) -> Result<(), TagError> {
        tokio::fs::copy(staging, dest).await?;
        let tag = build_tag(tags);
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || tag.write_to_path(&dest, Version::Id3v23))
            .await
            .map_err(|e| {
                TagError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
            })??;
        Ok(())
    }
}
