//! # Suite Runs
//!
//! Both suites end to end against in-memory deployments, plus the
//! observable properties the suites are meant to guarantee:
//!
//! 1. **Metadata**: `tokenURI(id)` is `baseTokenURI ++ decimal(id)`
//! 2. **Supply**: the ERC-721 suite leaves exactly `last - first + 1` tokens
//! 3. **Access control**: a non-owner mint leaves supply unchanged
//! 4. **Pausing**: pause then unpause leaves minting usable

#[cfg(test)]
mod tests {
    use ch_04_fixture::{
        FixtureError, FixtureParams, FixtureProvider, InMemoryFixtureProvider, TestFixture,
    };
    use ch_05_scenarios::{erc721, verifier, Suite};
    use shared_bus::EventFilter;
    use shared_types::{ContractEvent, EventKind, TxOptions, U256};
    use std::time::Duration;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn fixture(params: FixtureParams) -> TestFixture {
        let accounts = InMemoryFixtureProvider::dev_accounts(2).unwrap();
        InMemoryFixtureProvider::new(params)
            .config(&accounts)
            .await
            .unwrap()
    }

    fn example_params() -> FixtureParams {
        FixtureParams {
            base_token_uri: "https://example.com/".to_string(),
            ..FixtureParams::default()
        }
    }

    // =============================================================================
    // SUITES
    // =============================================================================

    #[tokio::test]
    async fn test_all_suites_pass_on_fresh_fixtures() {
        for suite in Suite::ALL {
            let fixture = fixture(FixtureParams::default()).await;
            let report = suite.run(&fixture, TIMEOUT).await;
            assert!(report.passed(), "{suite}: {report}");
            assert_eq!(report.failed_count(), 0);
            assert_eq!(report.skipped_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_reports_are_named_and_distinct() {
        let fixture = fixture(FixtureParams::default()).await;
        let token = erc721::run(&fixture, TIMEOUT).await;
        let verifier_report = verifier::run(&fixture, TIMEOUT).await;

        assert_eq!(token.suite, erc721::SUITE);
        assert_eq!(verifier_report.suite, verifier::SUITE);
        assert_ne!(token.run_id, verifier_report.run_id);
    }

    #[tokio::test]
    async fn test_suites_share_a_fixture_without_interfering() {
        // The suites use different contracts, so ids do not collide
        let fixture = fixture(FixtureParams::default()).await;
        assert!(erc721::run(&fixture, TIMEOUT).await.passed());
        assert!(verifier::run(&fixture, TIMEOUT).await.passed());

        assert_eq!(fixture.my_token.total_supply().await.unwrap(), U256::from(10));
        assert_eq!(
            fixture.soln_square_verifier.total_supply().await.unwrap(),
            U256::from(2)
        );
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    #[tokio::test]
    async fn test_token_uri_and_supply_after_suite() {
        let fixture = fixture(example_params()).await;
        assert!(erc721::run(&fixture, TIMEOUT).await.passed());

        assert_eq!(
            fixture.my_token.token_uri(U256::one()).await.unwrap(),
            "https://example.com/1"
        );
        assert_eq!(
            fixture.my_token.token_uri(U256::from(10)).await.unwrap(),
            "https://example.com/10"
        );
        assert_eq!(fixture.my_token.total_supply().await.unwrap(), U256::from(10));
    }

    #[tokio::test]
    async fn test_balances_after_transfer() {
        let fixture = fixture(FixtureParams::default()).await;
        assert!(erc721::run(&fixture, TIMEOUT).await.passed());

        // Token 1 moved to account_two in the approve/transferFrom step
        assert_eq!(
            fixture.my_token.balance_of(fixture.owner).await.unwrap(),
            U256::from(9)
        );
        assert_eq!(
            fixture.my_token.balance_of(fixture.account_two).await.unwrap(),
            U256::one()
        );
    }

    #[tokio::test]
    async fn test_non_owner_mint_leaves_supply_unchanged() {
        let fixture = fixture(FixtureParams::default()).await;
        let token = &fixture.my_token;

        let err = token
            .mint(fixture.account_two, U256::one(), TxOptions::sender(fixture.account_two))
            .await
            .unwrap_err();

        assert!(err.is_revert());
        assert_eq!(token.total_supply().await.unwrap(), U256::zero());
        assert!(token.owner_of(U256::one()).await.is_err());
    }

    #[tokio::test]
    async fn test_minting_usable_after_pause_and_unpause() {
        let fixture = fixture(FixtureParams::default()).await;
        let token = &fixture.my_token;
        let owner = TxOptions::sender(fixture.owner);

        token.pause(owner).await.unwrap();
        assert!(token
            .mint(fixture.owner, U256::one(), owner)
            .await
            .unwrap_err()
            .is_revert());

        token.unpause(owner).await.unwrap();
        let mut transfers = token.subscribe(EventFilter::kinds(vec![EventKind::Transfer]));
        let receipt = token.mint(fixture.owner, U256::one(), owner).await.unwrap();

        assert_eq!(receipt.events_of(EventKind::Transfer).count(), 1);
        let event = transfers.next_within(TIMEOUT).await.unwrap();
        assert!(event.event.is_mint());
        assert!(matches!(
            event.event,
            ContractEvent::Transfer { to, .. } if to == fixture.owner
        ));
        assert_eq!(token.total_supply().await.unwrap(), U256::one());
    }

    #[tokio::test]
    async fn test_fixture_needs_two_accounts() {
        let accounts = InMemoryFixtureProvider::dev_accounts(1).unwrap();
        let result = InMemoryFixtureProvider::new(FixtureParams::default())
            .config(&accounts)
            .await;

        assert!(matches!(
            result,
            Err(FixtureError::NotEnoughAccounts { needed: 2, found: 1 })
        ));
    }
}
