//! AWS Certificate Manager integration test
//!
//! Operation mode:
//! ```bash
//! AWS_ACCESS_KEY_ID=xxx AWS_SECRET_ACCESS_KEY=xxx TEST_DOMAIN=example.com \
//!     cargo test -p cert-orchestrator-provider --test acm_test -- --ignored --nocapture --test-threads=1
//! ```
//!
//! 证书申请后会停留在 `PENDING_VALIDATION`，测试不会等待签发。

mod common;

use cert_orchestrator_provider::{CertificateRequest, CertificateStatus, ProviderError};
use common::TestContext;

#[tokio::test]
#[ignore = "integration test: requires AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY and TEST_DOMAIN"]
async fn test_acm_request_and_describe() {
    skip_if_no_credentials!("AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY", "TEST_DOMAIN");

    let ctx = require_some!(TestContext::acm(), "创建测试上下文失败");
    let manager = require_some!(ctx.manager, "缺少 certificate manager");

    let request = CertificateRequest::dns(
        ctx.domain.clone(),
        vec![format!("www.{}", ctx.domain)],
    );
    let issued = require_ok!(
        manager.request_certificate(&request).await,
        "request_certificate 调用失败"
    );
    assert!(issued.arn.starts_with("arn:aws:acm:"));
    assert_eq!(issued.domain_validation_options.len(), 2);

    let detail = require_ok!(
        manager.describe_certificate(&issued.arn).await,
        "describe_certificate 调用失败"
    );
    assert_eq!(detail.arn, issued.arn);
    assert_eq!(detail.status, CertificateStatus::PendingValidation);

    println!("✓ request/describe 测试通过: {}", issued.arn);
}

#[tokio::test]
#[ignore = "integration test: requires AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY and TEST_DOMAIN"]
async fn test_acm_describe_unknown_certificate() {
    skip_if_no_credentials!("AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY", "TEST_DOMAIN");

    let ctx = require_some!(TestContext::acm(), "创建测试上下文失败");
    let manager = require_some!(ctx.manager, "缺少 certificate manager");

    let arn = "arn:aws:acm:us-east-1:000000000000:certificate/00000000-0000-0000-0000-000000000000";
    let result = manager.describe_certificate(arn).await;
    assert!(
        matches!(
            result,
            Err(ProviderError::CertificateNotFound { .. } | ProviderError::InvalidParameter { .. })
        ),
        "unexpected result: {result:?}"
    );
}

#[tokio::test]
#[ignore = "integration test: requires AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY and TEST_DOMAIN"]
async fn test_acm_rejects_malformed_domain() {
    skip_if_no_credentials!("AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY", "TEST_DOMAIN");

    let ctx = require_some!(TestContext::acm(), "创建测试上下文失败");
    let manager = require_some!(ctx.manager, "缺少 certificate manager");

    let result = manager
        .request_certificate(&CertificateRequest::dns("not a domain", Vec::new()))
        .await;
    assert!(
        matches!(result, Err(ProviderError::InvalidParameter { .. })),
        "unexpected result: {result:?}"
    );
}
