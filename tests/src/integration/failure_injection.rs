//! # Failure Injection
//!
//! Contracts that misbehave in controlled ways: slow responses, rejected
//! proofs, wrong metadata, missing access control. Each run must fail at
//! the expected step and skip the rest.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use ch_03_contracts::{
        reasons, ContractError, DeedMetadata, Erc721Mintable, InMemoryToken, ProofCheck,
    };
    use ch_04_fixture::{FixtureParams, FixtureProvider, InMemoryFixtureProvider, TestFixture};
    use ch_05_scenarios::{erc721, verifier, StepStatus};
    use shared_bus::{EventFilter, Subscription};
    use shared_types::{
        Address, FieldElement, Proof, PublicInput, TokenId, TxOptions, TxReceipt, U256,
    };
    use std::sync::Arc;
    use std::time::Duration;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn fixture_with(provider: InMemoryFixtureProvider) -> TestFixture {
        let accounts = InMemoryFixtureProvider::dev_accounts(2).unwrap();
        provider.config(&accounts).await.unwrap()
    }

    async fn fixture() -> TestFixture {
        fixture_with(InMemoryFixtureProvider::new(FixtureParams::default())).await
    }

    fn metadata(fixture: &TestFixture) -> DeedMetadata {
        DeedMetadata {
            name: fixture.name.clone(),
            symbol: fixture.symbol.clone(),
            base_token_uri: fixture.base_token_uri.clone(),
        }
    }

    fn failure_reason(status: &StepStatus) -> &str {
        match status {
            StepStatus::Failed(reason) => reason,
            other => panic!("expected a failed step, got {other:?}"),
        }
    }

    /// Lets anyone mint: the owner check is skipped.
    struct OpenMint {
        inner: InMemoryToken,
        owner: Address,
    }

    #[async_trait]
    impl Erc721Mintable for OpenMint {
        fn address(&self) -> Address {
            self.inner.address()
        }

        fn subscribe(&self, filter: EventFilter) -> Subscription {
            self.inner.subscribe(filter)
        }

        async fn is_owner(&self, caller: Address) -> Result<bool, ContractError> {
            self.inner.is_owner(caller).await
        }

        async fn name(&self) -> Result<String, ContractError> {
            self.inner.name().await
        }

        async fn symbol(&self) -> Result<String, ContractError> {
            self.inner.symbol().await
        }

        async fn base_token_uri(&self) -> Result<String, ContractError> {
            self.inner.base_token_uri().await
        }

        async fn total_supply(&self) -> Result<U256, ContractError> {
            self.inner.total_supply().await
        }

        async fn balance_of(&self, owner: Address) -> Result<U256, ContractError> {
            self.inner.balance_of(owner).await
        }

        async fn token_uri(&self, token_id: TokenId) -> Result<String, ContractError> {
            self.inner.token_uri(token_id).await
        }

        async fn owner_of(&self, token_id: TokenId) -> Result<Address, ContractError> {
            self.inner.owner_of(token_id).await
        }

        async fn owner(&self) -> Result<Address, ContractError> {
            self.inner.owner().await
        }

        async fn paused(&self) -> Result<bool, ContractError> {
            self.inner.paused().await
        }

        async fn pause(&self, opts: TxOptions) -> Result<TxReceipt, ContractError> {
            self.inner.pause(opts).await
        }

        async fn unpause(&self, opts: TxOptions) -> Result<TxReceipt, ContractError> {
            self.inner.unpause(opts).await
        }

        async fn mint(&self, to: Address, token_id: TokenId, _opts: TxOptions) -> Result<TxReceipt, ContractError> {
            self.inner.mint(to, token_id, TxOptions::sender(self.owner)).await
        }

        async fn approve(&self, to: Address, token_id: TokenId, opts: TxOptions) -> Result<TxReceipt, ContractError> {
            self.inner.approve(to, token_id, opts).await
        }

        async fn transfer_from(
            &self,
            from: Address,
            to: Address,
            token_id: TokenId,
            opts: TxOptions,
        ) -> Result<TxReceipt, ContractError> {
            self.inner.transfer_from(from, to, token_id, opts).await
        }
    }

    // =============================================================================
    // TIMEOUTS
    // =============================================================================

    #[tokio::test]
    async fn test_slow_contract_times_out_first_step() {
        let mut fixture = fixture().await;
        fixture.my_token = Arc::new(
            InMemoryToken::deploy(fixture.owner, metadata(&fixture))
                .with_latency(Duration::from_millis(200)),
        );

        let report = erc721::run(&fixture, Duration::from_millis(50)).await;

        let failure = report.first_failure().unwrap();
        assert_eq!(failure.ordinal, 1);
        assert!(failure_reason(&failure.status).contains("timed out"));
        assert_eq!(report.passed_count(), 0);
        assert_eq!(report.skipped_count(), 10);
    }

    // =============================================================================
    // CONTRACT STATE AND BEHAVIOUR
    // =============================================================================

    #[tokio::test]
    async fn test_wrong_expected_name_fails_metadata_step() {
        let mut fixture = fixture().await;
        fixture.name = "OtherToken".to_string();

        let report = erc721::run(&fixture, TIMEOUT).await;

        let failure = report.first_failure().unwrap();
        assert_eq!(failure.ordinal, 2);
        let reason = failure_reason(&failure.status);
        assert!(reason.contains("OtherToken"), "{reason}");
        assert!(reason.contains(&FixtureParams::default().name), "{reason}");
        assert_eq!(report.skipped_count(), 9);
    }

    #[tokio::test]
    async fn test_already_paused_contract_fails_pause_step() {
        let fixture = fixture().await;
        fixture
            .my_token
            .pause(TxOptions::sender(fixture.owner))
            .await
            .unwrap();

        let report = erc721::run(&fixture, TIMEOUT).await;

        let failure = report.first_failure().unwrap();
        assert_eq!(failure.ordinal, 5);
        assert!(failure_reason(&failure.status).contains(reasons::PAUSED));
        assert_eq!(report.passed_count(), 4);
        assert_eq!(report.skipped_count(), 6);
    }

    #[tokio::test]
    async fn test_missing_access_control_is_reported() {
        let mut fixture = fixture().await;
        fixture.my_token = Arc::new(OpenMint {
            inner: InMemoryToken::deploy(fixture.owner, metadata(&fixture)),
            owner: fixture.owner,
        });

        let report = erc721::run(&fixture, TIMEOUT).await;

        // Everything up to the non-owner mint passes; that one must not
        let failure = report.first_failure().unwrap();
        assert_eq!(failure.ordinal, 11);
        assert!(failure_reason(&failure.status).contains("expected the transaction to be rejected"));
        assert_eq!(report.passed_count(), 10);
    }

    // =============================================================================
    // PROOF VERIFICATION
    // =============================================================================

    #[tokio::test]
    async fn test_rejected_proof_fails_solution_step() {
        let reject_all = |_: &Proof, _: &PublicInput| false;
        let fixture = fixture_with(
            InMemoryFixtureProvider::new(FixtureParams::default())
                .with_proof_check(Arc::new(reject_all)),
        )
        .await;

        let report = verifier::run(&fixture, TIMEOUT).await;

        let failure = report.first_failure().unwrap();
        assert_eq!(failure.ordinal, 7);
        assert!(failure_reason(&failure.status).contains(reasons::INVALID_PROOF));
        assert_eq!(
            fixture.soln_square_verifier.total_supply().await.unwrap(),
            U256::one()
        );
    }

    #[tokio::test]
    async fn test_square_check_accepts_fixture_input() {
        // The circuit proves knowledge of a square root: input = [a * a, 1]
        let square: Arc<dyn ProofCheck> = Arc::new(|_: &Proof, input: &PublicInput| {
            matches!(input.as_slice(), [value, one] if *value == FieldElement::from(9) && *one == FieldElement::from(1))
        });
        let fixture = fixture_with(
            InMemoryFixtureProvider::new(FixtureParams::default()).with_proof_check(square),
        )
        .await;

        let report = verifier::run(&fixture, TIMEOUT).await;
        assert!(report.passed(), "{report}");
    }

    #[tokio::test]
    async fn test_resubmitted_solution_is_rejected() {
        let fixture = fixture().await;
        assert!(verifier::run(&fixture, TIMEOUT).await.passed());

        let err = fixture
            .soln_square_verifier
            .add_solution(
                &fixture.proof,
                &fixture.input,
                fixture.owner,
                U256::from(99),
                TxOptions::sender(fixture.owner),
            )
            .await
            .unwrap_err();

        assert_eq!(err.revert_reason(), Some(reasons::SOLUTION_EXISTS));
        assert!(fixture.soln_square_verifier.owner_of(U256::from(99)).await.is_err());
    }
}
