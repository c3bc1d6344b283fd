#![doc = "S3 store: implements the core ObjectStore trait on top of aws-sdk-s3."]
//
//! # S3 Integration (CLI <-> Core)
//!
//! This module wires the [`ObjectStore`] trait from `folder-upload-core` to a real bucket.
//! The core never sees AWS types; everything SDK-specific stays here.
//!
//! ## Client Usage
//! - Construct [`S3Store`] with [`S3Store::from_region`]; credentials come from the default
//!   AWS provider chain (environment, profile, IMDS, ...).
//! - Construction fails if no credentials can be resolved, so a misconfigured run stops
//!   before any file is read.
//! - Every object is written with the `private` canned ACL.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use folder_upload_core::{ObjectStore, StoreError};
use tokio::fs::File;

pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Load the SDK configuration for `region` and make sure credentials resolve.
    pub async fn from_region(region: &str) -> Result<Self> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        let provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| anyhow!("Unable to load SDK config: no credentials provider"))?;
        if let Err(e) = provider.provide_credentials().await {
            tracing::error!(error = %DisplayErrorContext(&e), "Failed to resolve AWS credentials");
            return Err(e).context("Unable to load SDK config: credentials did not resolve");
        }

        tracing::info!(region, "Initialized S3 client");
        Ok(Self::new(Client::new(&sdk_config)))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, bucket: &str, key: &str, body: File) -> Result<(), StoreError> {
        let body = ByteStream::read_from().file(body).build().await?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .acl(ObjectCannedAcl::Private)
            .send()
            .await
            .map_err(|e| DisplayErrorContext(e).to_string())?;

        tracing::debug!(bucket, key, "PutObject succeeded");
        Ok(())
    }
}
