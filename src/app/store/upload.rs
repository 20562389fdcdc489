//! Streaming multipart upload
//!
//! Incoming chunks are accumulated until a full part is available, and each
//! part is uploaded before the next chunk is pulled from the source. At most
//! one part (plus one incoming chunk) is held in memory.
//!
//! The multipart upload is only created once the first full part exists.
//! Payloads smaller than one part, including empty ones, go through a single
//! `PutObject` instead.

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use bytes::Bytes;
use futures::StreamExt;

use crate::app::store::ByteStream;
use crate::constants::transfer;
use crate::errors::{StoreError, TransferResult};

/// One in-progress upload of a single object
pub struct MultipartUpload<'a> {
    client: &'a Client,
    bucket: &'a str,
    key: &'a str,
    part_size: usize,
    upload_id: Option<String>,
    parts: Vec<CompletedPart>,
    buffer: Vec<u8>,
    bytes_sent: u64,
}

impl<'a> MultipartUpload<'a> {
    pub fn new(client: &'a Client, bucket: &'a str, key: &'a str, part_size: usize) -> Self {
        Self {
            client,
            bucket,
            key,
            part_size,
            upload_id: None,
            parts: Vec::new(),
            buffer: Vec::with_capacity(part_size),
            bytes_sent: 0,
        }
    }

    /// Drain `body` into the store
    ///
    /// On failure the multipart upload, if one was started, is aborted so no
    /// orphaned parts are left behind.
    pub async fn run(mut self, mut body: ByteStream) -> TransferResult<u64> {
        let result = self.drive(&mut body).await;
        if result.is_err() {
            self.abort().await;
        }
        result
    }

    async fn drive(&mut self, body: &mut ByteStream) -> TransferResult<u64> {
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            self.buffer.extend_from_slice(&chunk);

            while self.buffer.len() >= self.part_size {
                let part: Vec<u8> = self.buffer.drain(..self.part_size).collect();
                self.upload_part(Bytes::from(part)).await?;
            }
        }

        self.finish().await
    }

    async fn finish(&mut self) -> TransferResult<u64> {
        let remaining = Bytes::from(std::mem::take(&mut self.buffer));

        let Some(upload_id) = self.upload_id.clone() else {
            let size = remaining.len() as u64;
            self.client
                .put_object()
                .bucket(self.bucket)
                .key(self.key)
                .content_type(transfer::CONTENT_TYPE)
                .body(remaining.into())
                .send()
                .await
                .map_err(|err| self.commit_error(DisplayErrorContext(&err)))?;
            tracing::debug!("Stored {} with a single put ({} bytes)", self.key, size);
            return Ok(size);
        };

        if !remaining.is_empty() {
            self.upload_part(remaining).await?;
        }

        let completed = CompletedMultipartUpload::builder()
            .set_parts(Some(std::mem::take(&mut self.parts)))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(self.bucket)
            .key(self.key)
            .upload_id(&upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .map_err(|err| self.commit_error(DisplayErrorContext(&err)))?;

        // Completed uploads must not be aborted
        self.upload_id = None;

        tracing::debug!("Completed multipart upload of {} ({} bytes)", self.key, self.bytes_sent);
        Ok(self.bytes_sent)
    }

    async fn upload_part(&mut self, data: Bytes) -> TransferResult<()> {
        let upload_id = self.ensure_started().await?;
        let part_number = self.parts.len() as i32 + 1;
        let size = data.len() as u64;

        let output = self
            .client
            .upload_part()
            .bucket(self.bucket)
            .key(self.key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(data.into())
            .send()
            .await
            .map_err(|err| self.commit_error(DisplayErrorContext(&err)))?;

        self.parts.push(
            CompletedPart::builder()
                .e_tag(output.e_tag().unwrap_or_default())
                .part_number(part_number)
                .build(),
        );
        self.bytes_sent += size;

        tracing::debug!("Uploaded part {} of {} ({} bytes)", part_number, self.key, size);
        Ok(())
    }

    async fn ensure_started(&mut self) -> TransferResult<String> {
        if let Some(upload_id) = &self.upload_id {
            return Ok(upload_id.clone());
        }

        let output = self
            .client
            .create_multipart_upload()
            .bucket(self.bucket)
            .key(self.key)
            .content_type(transfer::CONTENT_TYPE)
            .send()
            .await
            .map_err(|err| self.commit_error(DisplayErrorContext(&err)))?;

        let upload_id = output
            .upload_id()
            .map(str::to_string)
            .ok_or_else(|| self.commit_error("store returned no upload id"))?;

        self.upload_id = Some(upload_id.clone());
        Ok(upload_id)
    }

    async fn abort(&mut self) {
        let Some(upload_id) = self.upload_id.take() else {
            return;
        };

        if let Err(err) = self
            .client
            .abort_multipart_upload()
            .bucket(self.bucket)
            .key(self.key)
            .upload_id(&upload_id)
            .send()
            .await
        {
            tracing::warn!(
                "Failed to abort multipart upload {} for {}, orphaned parts may remain: {}",
                upload_id,
                self.key,
                DisplayErrorContext(&err)
            );
        }
    }

    fn commit_error(&self, reason: impl std::fmt::Display) -> StoreError {
        StoreError::Commit {
            key: self.key.to_string(),
            reason: reason.to_string(),
        }
    }
}
