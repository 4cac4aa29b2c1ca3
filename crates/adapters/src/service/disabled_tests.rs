// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn disabled_service_refuses_cookies() {
    let service = DisabledService::new();

    let inhibit = TokenService::inhibit(&service, "kad", "playing").await;
    let uninhibit = service.uninhibit(1).await;

    assert!(matches!(inhibit, Err(ServiceError::Disabled)));
    assert!(matches!(uninhibit, Err(ServiceError::Disabled)));
}

#[tokio::test]
async fn disabled_service_refuses_handles() {
    let service = DisabledService::new();

    let result = HandleService::inhibit(&service, "kad", "playing").await;

    assert!(matches!(result, Err(ServiceError::Disabled)));
}
