//! Wire types of the catalog API

use serde::Deserialize;

use crate::app::models::VideoRecord;

/// One page of `GET /videos`
#[derive(Debug, Deserialize)]
pub struct VideoPage {
    #[serde(default)]
    pub data: Vec<VideoSummary>,
}

/// Listing entry; carries no asset URLs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub video_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Body of `GET /videos/{id}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    pub video_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub assets: Option<VideoAssets>,
}

#[derive(Debug, Deserialize)]
pub struct VideoAssets {
    #[serde(default)]
    pub mp4: Option<String>,
}

impl From<VideoSummary> for VideoRecord {
    fn from(summary: VideoSummary) -> Self {
        VideoRecord::new(summary.video_id, summary.title.unwrap_or_default())
    }
}

impl From<VideoDetail> for VideoRecord {
    fn from(detail: VideoDetail) -> Self {
        let source_url = detail
            .assets
            .and_then(|assets| assets.mp4)
            .filter(|url| !url.trim().is_empty());

        VideoRecord {
            video_id: detail.video_id,
            title: detail.title.unwrap_or_default(),
            source_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_without_mp4_has_no_source() {
        let detail: VideoDetail = serde_json::from_str(
            r#"{"videoId":"vi1","title":"Clip","assets":{"hls":"https://h/manifest.m3u8"}}"#,
        )
        .unwrap();
        let record = VideoRecord::from(detail);
        assert_eq!(record.source_url, None);
        assert_eq!(record.title, "Clip");
    }

    #[test]
    fn test_detail_with_mp4() {
        let detail: VideoDetail = serde_json::from_str(
            r#"{"videoId":"vi1","title":null,"assets":{"mp4":"https://cdn/vi1.mp4"}}"#,
        )
        .unwrap();
        let record = VideoRecord::from(detail);
        assert_eq!(record.source_url.as_deref(), Some("https://cdn/vi1.mp4"));
        assert_eq!(record.title, "");
    }

    #[test]
    fn test_page_ignores_extra_fields() {
        let page: VideoPage = serde_json::from_str(
            r#"{"data":[{"videoId":"a","title":"A","public":true}],"pagination":{"currentPage":1}}"#,
        )
        .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].video_id, "a");
    }
}
