use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Object key of a candidate's stored PDF.
pub fn attachment_key(id: Uuid) -> String {
    format!("cvs/{id}.pdf")
}

pub async fn put_attachment(
    s3: &S3Client,
    bucket: &str,
    key: &str,
    pdf: Vec<u8>,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(pdf))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

    info!("Uploaded attachment to s3://{bucket}/{key}");
    Ok(())
}

/// Fetches a stored attachment; a missing object is `NotFound`.
pub async fn get_attachment(s3: &S3Client, bucket: &str, key: &str) -> Result<Bytes, AppError> {
    let object = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| {
            if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                AppError::NotFound(format!("Attachment {key} not found"))
            } else {
                AppError::Storage(format!("S3 download failed: {e}"))
            }
        })?;

    let data = object
        .body
        .collect()
        .await
        .map_err(|e| AppError::Storage(format!("S3 body read failed: {e}")))?;
    Ok(data.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_key_layout() {
        let id = Uuid::parse_str("6f1c1c36-3f0a-4c1e-9d0a-2b8a7a0c9e11").unwrap();
        assert_eq!(attachment_key(id), "cvs/6f1c1c36-3f0a-4c1e-9d0a-2b8a7a0c9e11.pdf");
    }
}
