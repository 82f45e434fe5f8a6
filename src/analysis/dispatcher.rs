//! Tier dispatch with a single provider fallback.

use std::sync::Arc;

use chrono::Utc;
use tracing::{Instrument, info, warn};

use super::parser::parse_structured;
use crate::client::{
    Completion, CompletionRequest, FallbackPolicy, ProviderAdapter, ProviderError,
};
use crate::config::settings::DEFAULT_MAX_DOCUMENT_BYTES;
use crate::observability::ProviderCallSpan;
use crate::prompts::PromptCatalog;
use crate::types::{AnalysisRequest, AnalysisResult, ProviderRole};
use crate::{Error, Result};

/// Runs one analysis: primary provider, at most one fallback call, then
/// defensive parsing into the tier's response shape.
#[derive(Debug, Clone)]
pub struct AnalysisDispatcher {
    catalog: PromptCatalog,
    primary: Arc<dyn ProviderAdapter>,
    fallback: Arc<dyn ProviderAdapter>,
    policy: FallbackPolicy,
    max_document_bytes: usize,
}

impl AnalysisDispatcher {
    pub fn new(primary: Arc<dyn ProviderAdapter>, fallback: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            catalog: PromptCatalog::new(),
            primary,
            fallback,
            policy: FallbackPolicy::default(),
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_document_bytes(mut self, max: usize) -> Self {
        self.max_document_bytes = max;
        self
    }

    pub fn primary(&self) -> &dyn ProviderAdapter {
        self.primary.as_ref()
    }

    pub fn fallback(&self) -> &dyn ProviderAdapter {
        self.fallback.as_ref()
    }

    pub fn catalog(&self) -> &PromptCatalog {
        &self.catalog
    }

    /// Local checks that must pass before any provider or payment call.
    pub fn validate_document(&self, document: &str) -> Result<()> {
        if document.len() > self.max_document_bytes {
            return Err(Error::InvalidDocument {
                message: format!(
                    "document is {} bytes; the limit is {} bytes",
                    document.len(),
                    self.max_document_bytes
                ),
            });
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, request), fields(tier = %request.tier))]
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        self.validate_document(&request.document_content)?;

        let spec = self.catalog.get_prompt(request.tier);
        let completion_request = CompletionRequest::new(
            spec.system_prompt(),
            request.document_content.as_str(),
            spec.token_budget,
        )
        .with_temperature(self.primary.config().temperature);

        let (role, adapter, completion) = match self
            .call(self.primary.as_ref(), ProviderRole::Primary, request, &completion_request)
            .await
        {
            Ok(completion) => (ProviderRole::Primary, self.primary.as_ref(), completion),
            Err(primary_err) => {
                if !primary_err.kind.is_provider_fault() {
                    return Err(invalid_document(primary_err));
                }
                if !self.policy.should_fallback(&primary_err) {
                    return Err(Error::AnalysisUnavailable {
                        primary: primary_err,
                        fallback: None,
                    });
                }

                warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    kind = %primary_err.kind,
                    "primary provider failed, falling back"
                );

                let fallback_request = completion_request
                    .clone()
                    .with_temperature(self.fallback.config().temperature);
                match self
                    .call(
                        self.fallback.as_ref(),
                        ProviderRole::Fallback,
                        request,
                        &fallback_request,
                    )
                    .await
                {
                    Ok(completion) => (ProviderRole::Fallback, self.fallback.as_ref(), completion),
                    Err(fallback_err) if !fallback_err.kind.is_provider_fault() => {
                        return Err(invalid_document(fallback_err));
                    }
                    Err(fallback_err) => {
                        return Err(Error::AnalysisUnavailable {
                            primary: primary_err,
                            fallback: Some(fallback_err),
                        });
                    }
                }
            }
        };

        let structured_fields = parse_structured(&completion.text, spec.response_shape);
        let result = AnalysisResult {
            tier: request.tier,
            structured_fields,
            provider_used: role,
            provider: adapter.name().to_string(),
            model: completion.model,
            token_usage: completion.usage,
            patient_id: request.patient_id.clone(),
            analyzed_at: Utc::now(),
            payment: None,
        };

        info!(
            provider = %result.provider,
            role = %role,
            input_tokens = result.token_usage.input_tokens,
            output_tokens = result.token_usage.output_tokens,
            fields_found = result.fields_found(),
            "analysis complete"
        );
        Ok(result)
    }

    async fn call(
        &self,
        adapter: &dyn ProviderAdapter,
        role: ProviderRole,
        request: &AnalysisRequest,
        completion_request: &CompletionRequest,
    ) -> std::result::Result<Completion, ProviderError> {
        let span = ProviderCallSpan::new(adapter.name(), role, request.tier);
        let outcome = adapter
            .complete(completion_request)
            .instrument(span.span().clone())
            .await;
        match &outcome {
            Ok(completion) => span.record_usage(&completion.usage),
            Err(err) => span.record_error(err.kind.as_str()),
        }
        span.finish();
        outcome
    }
}

fn invalid_document(err: ProviderError) -> Error {
    Error::InvalidDocument {
        message: format!("{} rejected the document: {}", err.provider, err.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{FallbackTrigger, ProviderErrorKind};
    use crate::testing::ScriptedProvider;
    use crate::types::{AnalysisTier, Extraction};

    const BASIC_JSON: &str = r#"{"vital_signs": {"bp": "150/95"}, "medications": ["Lisinopril"],
        "conditions": ["Hypertension"], "assessment": "Elevated blood pressure"}"#;

    fn dispatcher(
        primary: &Arc<ScriptedProvider>,
        fallback: &Arc<ScriptedProvider>,
    ) -> AnalysisDispatcher {
        AnalysisDispatcher::new(primary.clone(), fallback.clone())
    }

    #[tokio::test]
    async fn test_primary_success() {
        let primary = Arc::new(ScriptedProvider::succeeding("anthropic", BASIC_JSON));
        let fallback = Arc::new(ScriptedProvider::succeeding("openai", "{}"));

        let result = dispatcher(&primary, &fallback)
            .analyze(&AnalysisRequest::new("BP 150/95", AnalysisTier::Basic))
            .await
            .unwrap();

        assert_eq!(result.provider_used, ProviderRole::Primary);
        assert_eq!(result.provider, "anthropic");
        assert!(result.is_complete());
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_every_fault_kind_falls_back() {
        for kind in [
            ProviderErrorKind::RateLimit,
            ProviderErrorKind::Auth,
            ProviderErrorKind::Timeout,
            ProviderErrorKind::MalformedResponse,
            ProviderErrorKind::Unavailable,
        ] {
            let primary = Arc::new(ScriptedProvider::failing("anthropic", kind));
            let fallback = Arc::new(ScriptedProvider::succeeding("openai", BASIC_JSON));

            let result = dispatcher(&primary, &fallback)
                .analyze(&AnalysisRequest::new("doc", AnalysisTier::Basic))
                .await
                .unwrap();

            assert_eq!(result.provider_used, ProviderRole::Fallback, "{}", kind);
            assert_eq!(result.provider, "openai");
            assert_eq!(fallback.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_both_fail() {
        let primary = Arc::new(ScriptedProvider::failing("anthropic", ProviderErrorKind::Timeout));
        let fallback = Arc::new(ScriptedProvider::failing("openai", ProviderErrorKind::RateLimit));

        let err = dispatcher(&primary, &fallback)
            .analyze(&AnalysisRequest::new("doc", AnalysisTier::Comprehensive))
            .await
            .unwrap_err();

        match err {
            Error::AnalysisUnavailable { primary: p, fallback: Some(f) } => {
                assert_eq!(p.kind, ProviderErrorKind::Timeout);
                assert_eq!(f.kind, ProviderErrorKind::RateLimit);
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_same_prompt_and_budget_sent_to_fallback() {
        let primary = Arc::new(ScriptedProvider::failing(
            "anthropic",
            ProviderErrorKind::Unavailable,
        ));
        let fallback = Arc::new(ScriptedProvider::succeeding("openai", "{}"));

        dispatcher(&primary, &fallback)
            .analyze(&AnalysisRequest::new("doc", AnalysisTier::Complicated))
            .await
            .unwrap();

        let sent_primary = primary.last_request().unwrap();
        let sent_fallback = fallback.last_request().unwrap();
        assert_eq!(sent_primary.system_prompt, sent_fallback.system_prompt);
        assert_eq!(sent_fallback.max_tokens, 8192);
    }

    #[tokio::test]
    async fn test_provider_rejecting_document_does_not_fall_back() {
        let primary = Arc::new(ScriptedProvider::failing(
            "anthropic",
            ProviderErrorKind::InvalidDocument,
        ));
        let fallback = Arc::new(ScriptedProvider::succeeding("openai", BASIC_JSON));

        let err = dispatcher(&primary, &fallback)
            .analyze(&AnalysisRequest::new("doc", AnalysisTier::Basic))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidDocument { .. }));
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_policy_can_exclude_trigger() {
        let primary = Arc::new(ScriptedProvider::failing("anthropic", ProviderErrorKind::Auth));
        let fallback = Arc::new(ScriptedProvider::succeeding("openai", BASIC_JSON));

        let err = dispatcher(&primary, &fallback)
            .with_policy(FallbackPolicy::default().without(FallbackTrigger::AuthFailed))
            .analyze(&AnalysisRequest::new("doc", AnalysisTier::Basic))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AnalysisUnavailable { fallback: None, .. }));
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_oversized_document_never_reaches_provider() {
        let primary = Arc::new(ScriptedProvider::succeeding("anthropic", BASIC_JSON));
        let fallback = Arc::new(ScriptedProvider::succeeding("openai", BASIC_JSON));

        let err = dispatcher(&primary, &fallback)
            .with_max_document_bytes(16)
            .analyze(&AnalysisRequest::new("x".repeat(17), AnalysisTier::Basic))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidDocument { .. }));
        assert_eq!(primary.calls() + fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_document_and_prose_reply_yield_full_shape() {
        let primary = Arc::new(ScriptedProvider::succeeding(
            "anthropic",
            "I could not find anything.",
        ));
        let fallback = Arc::new(ScriptedProvider::succeeding("openai", "{}"));

        for tier in AnalysisTier::ALL {
            let result = dispatcher(&primary, &fallback)
                .analyze(&AnalysisRequest::new("", tier))
                .await
                .unwrap();
            let expected = PromptCatalog::new().get_prompt(tier).response_shape;
            assert_eq!(result.structured_fields.len(), expected.len());
            for key in expected {
                assert_eq!(result.field(key), Some(&Extraction::NotFound));
            }
        }
    }

    #[tokio::test]
    async fn test_patient_id_and_usage_attached() {
        let primary =
            Arc::new(ScriptedProvider::succeeding("anthropic", BASIC_JSON).with_usage(120, 40));
        let fallback = Arc::new(ScriptedProvider::succeeding("openai", "{}"));

        let result = dispatcher(&primary, &fallback)
            .analyze(
                &AnalysisRequest::new("doc", AnalysisTier::Basic).with_patient_id("patient_001"),
            )
            .await
            .unwrap();

        assert_eq!(result.patient_id.as_deref(), Some("patient_001"));
        assert_eq!(result.token_usage.total(), 160);
    }
}
