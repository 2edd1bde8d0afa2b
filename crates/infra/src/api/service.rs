//! High-level Incognia API client
//!
//! [`IncogniaApi`] is created once from a [`ClientConfig`] and shared by
//! cloning; every clone uses the same pipeline, credential cache and
//! connection pool.

use std::sync::Arc;

use incognia_domain::{
    AccountSearchResponse, AssessmentResponse, ClientConfig, FeedbackQueryParams, Result,
    RegisterFeedbackProps, RegisterLoginProps, RegisterPaymentProps, RegisterSignupProps,
    RegisterWebLoginProps, RegisterWebSignupProps, SearchAccountsProps,
};
use tracing::instrument;

use super::client::RequestPipeline;
use super::resources;

/// Typed entry point for every supported resource
#[derive(Clone, Debug)]
pub struct IncogniaApi {
    pipeline: Arc<RequestPipeline>,
}

impl IncogniaApi {
    /// # Errors
    /// Returns [`incognia_domain::IncogniaError::Usage`] if `config` is
    /// invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self::from_pipeline(RequestPipeline::new(config)?))
    }

    /// Wrap a pipeline built with custom retry predicate or clock.
    pub fn from_pipeline(pipeline: RequestPipeline) -> Self {
        Self { pipeline: Arc::new(pipeline) }
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    #[instrument(skip_all)]
    pub async fn register_signup(&self, props: &RegisterSignupProps) -> Result<AssessmentResponse> {
        let descriptor = resources::register_signup(self.pipeline.base_url(), props)?;
        self.pipeline.request_resource_as(&descriptor).await
    }

    #[instrument(skip_all)]
    pub async fn register_web_signup(
        &self,
        props: &RegisterWebSignupProps,
    ) -> Result<AssessmentResponse> {
        let descriptor = resources::register_web_signup(self.pipeline.base_url(), props)?;
        self.pipeline.request_resource_as(&descriptor).await
    }

    #[instrument(skip(self))]
    pub async fn get_signup_assessment(&self, signup_id: &str) -> Result<AssessmentResponse> {
        let descriptor = resources::get_signup_assessment(self.pipeline.base_url(), signup_id)?;
        self.pipeline.request_resource_as(&descriptor).await
    }

    #[instrument(skip_all)]
    pub async fn register_login(&self, props: &RegisterLoginProps) -> Result<AssessmentResponse> {
        let descriptor = resources::register_login(self.pipeline.base_url(), props)?;
        self.pipeline.request_resource_as(&descriptor).await
    }

    #[instrument(skip_all)]
    pub async fn register_web_login(
        &self,
        props: &RegisterWebLoginProps,
    ) -> Result<AssessmentResponse> {
        let descriptor = resources::register_web_login(self.pipeline.base_url(), props)?;
        self.pipeline.request_resource_as(&descriptor).await
    }

    #[instrument(skip_all)]
    pub async fn register_payment(
        &self,
        props: &RegisterPaymentProps,
    ) -> Result<AssessmentResponse> {
        let descriptor = resources::register_payment(self.pipeline.base_url(), props)?;
        self.pipeline.request_resource_as(&descriptor).await
    }

    /// Feedback responses carry no body of interest.
    #[instrument(skip(self, props), fields(event = ?props.event))]
    pub async fn register_feedback(
        &self,
        props: &RegisterFeedbackProps,
        query: Option<FeedbackQueryParams>,
    ) -> Result<()> {
        let descriptor = resources::register_feedback(self.pipeline.base_url(), props, query)?;
        self.pipeline.request_resource(&descriptor).await.map(|_| ())
    }

    #[instrument(skip_all)]
    pub async fn search_accounts(
        &self,
        props: &SearchAccountsProps,
    ) -> Result<AccountSearchResponse> {
        let descriptor = resources::search_accounts(self.pipeline.base_url(), props)?;
        self.pipeline.request_resource_as(&descriptor).await
    }
}
