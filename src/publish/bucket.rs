use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;

use crate::error::{TapError, TapResult};

/// One page of a key listing; `next` is the cursor for the following page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KeyPage {
    pub keys: Vec<String>,
    pub next: Option<String>,
}

/// Object storage seam used by the publisher.
#[allow(async_fn_in_trait)]
pub trait Bucket {
    fn name(&self) -> &str;
    async fn list_keys(&self, continuation: Option<String>) -> TapResult<KeyPage>;
    async fn delete(&self, key: &str) -> TapResult<()>;
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> TapResult<()>;
}

pub struct S3Bucket {
    client: Client,
    bucket: String,
}

impl S3Bucket {
    /// Credentials and region come from the standard AWS environment chain.
    pub async fn connect(bucket: &str) -> Self {
        let conf = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self { client: Client::new(&conf), bucket: bucket.to_string() }
    }
}

impl Bucket for S3Bucket {
    fn name(&self) -> &str { &self.bucket }

    async fn list_keys(&self, continuation: Option<String>) -> TapResult<KeyPage> {
        let out = self.client.list_objects_v2()
            .bucket(&self.bucket)
            .set_continuation_token(continuation)
            .send()
            .await
            .map_err(|e| TapError::publish(&self.bucket, DisplayErrorContext(&e)))?;
        let keys = out.contents().iter().filter_map(|o| o.key().map(str::to_string)).collect();
        let next = if out.is_truncated().unwrap_or(false) { out.next_continuation_token().map(str::to_string) } else { None };
        Ok(KeyPage { keys, next })
    }

    async fn delete(&self, key: &str) -> TapResult<()> {
        self.client.delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| TapError::publish(key, DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> TapResult<()> {
        self.client.put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| TapError::publish(key, DisplayErrorContext(&e)))?;
        Ok(())
    }
}
