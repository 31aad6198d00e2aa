//! # JSON-RPC Backend
//!
//! The suites and contract adapters against a local mock node, exercising
//! the full path: calldata encoding, gas estimation, node-managed sending,
//! receipt polling, log decoding and revert classification.

#[cfg(test)]
mod tests {
    use crate::support::{MockNode, RevertStyle};
    use ch_02_rpc_client::{RpcClient, Signer};
    use ch_03_contracts::{reasons, DeedMetadata, Erc721Mintable, ReceiptPolicy, RpcContract};
    use ch_04_fixture::{
        ContractAddresses, FixtureError, FixtureParams, FixtureProvider, InMemoryFixtureProvider,
        RpcFixtureProvider,
    };
    use ch_05_scenarios::Suite;
    use harness_runtime::config::NetworkId;
    use harness_runtime::{Backend, HarnessConfig, HarnessRuntime, RuntimeError};
    use shared_bus::EventFilter;
    use shared_types::{Address, ContractEvent, EventKind, TxOptions, U256};
    use std::sync::Arc;
    use std::time::Duration;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const RECEIPTS: ReceiptPolicy = ReceiptPolicy {
        poll_interval: Duration::from_millis(10),
        timeout: Duration::from_secs(5),
    };

    fn metadata(params: &FixtureParams) -> DeedMetadata {
        DeedMetadata {
            name: params.name.clone(),
            symbol: params.symbol.clone(),
            base_token_uri: params.base_token_uri.clone(),
        }
    }

    fn accounts() -> Vec<Address> {
        InMemoryFixtureProvider::dev_accounts(2).unwrap()
    }

    /// A node with both contracts deployed, and a development profile
    /// pointing at it.
    async fn deployed() -> (MockNode, HarnessConfig) {
        let accounts = accounts();
        let node = MockNode::start(accounts.clone()).await.unwrap();

        let mut config = HarnessConfig::default();
        config.networks.development.port = node.port();
        config.suite.timeout_ms = 10_000;
        config.suite.request_timeout_ms = 5_000;
        config.suite.receipt_poll_ms = 10;
        config.contracts = ContractAddresses {
            my_token: Some(node.deploy(accounts[0], metadata(&config.fixture))),
            soln_square_verifier: Some(node.deploy(accounts[0], metadata(&config.fixture))),
        };
        (node, config)
    }

    fn contract(node: &MockNode, address: Address) -> RpcContract {
        let client = Arc::new(RpcClient::new(node.endpoint(), Duration::from_secs(5)).unwrap());
        RpcContract::new(address, client, Signer::NodeManaged, RECEIPTS)
    }

    // =============================================================================
    // SUITES
    // =============================================================================

    #[tokio::test]
    async fn test_all_suites_pass_over_json_rpc() {
        let (node, config) = deployed().await;
        let my_token = config.contracts.my_token.unwrap();
        let verifier = config.contracts.soln_square_verifier.unwrap();

        let runtime = HarnessRuntime::new(config, Backend::Rpc).unwrap();
        let reports = runtime.run(&Suite::ALL).await.unwrap();

        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert!(report.passed(), "{report}");
        }

        assert_eq!(node.ledger(&my_token).unwrap().total_supply(), U256::from(10));
        assert_eq!(node.ledger(&verifier).unwrap().total_supply(), U256::from(2));

        let methods = node.methods();
        for method in ["eth_chainId", "eth_accounts", "eth_getCode", "eth_estimateGas", "eth_sendTransaction"] {
            assert!(methods.iter().any(|m| m == method), "{method} never called");
        }
    }

    #[tokio::test]
    async fn test_chain_mismatch_stops_run() {
        let (_node, mut config) = deployed().await;
        config.networks.development.network_id = NetworkId("4".to_string());

        let runtime = HarnessRuntime::new(config, Backend::Rpc).unwrap();
        let result = runtime.run(&[Suite::Erc721]).await;

        assert!(matches!(
            result,
            Err(RuntimeError::ChainMismatch { actual: 1337, .. })
        ));
    }

    #[tokio::test]
    async fn test_contract_without_code_is_unbound() {
        let (node, config) = deployed().await;
        let client = Arc::new(RpcClient::new(node.endpoint(), Duration::from_secs(5)).unwrap());
        let provider = RpcFixtureProvider::new(
            client,
            Signer::NodeManaged,
            config.fixture.clone(),
            ContractAddresses {
                my_token: config.contracts.my_token,
                soln_square_verifier: Some(Address::repeat_byte(0x42)),
            },
            RECEIPTS,
        );

        let accounts = provider.accounts().await.unwrap();
        let result = provider.config(&accounts).await;

        assert!(matches!(
            result,
            Err(FixtureError::UnboundContract { contract: "SolnSquareVerifier", .. })
        ));
    }

    // =============================================================================
    // CONTRACT ADAPTER
    // =============================================================================

    #[tokio::test]
    async fn test_mint_receipt_and_event() {
        let (node, config) = deployed().await;
        let owner = accounts()[0];
        let token = contract(&node, config.contracts.my_token.unwrap());

        let mut transfers = token.subscribe(EventFilter::kinds(vec![EventKind::Transfer]));
        let receipt = token
            .mint(owner, U256::from(5), TxOptions::sender(owner))
            .await
            .unwrap();

        assert_eq!(receipt.block_number, 1);
        assert_eq!(receipt.events_of(EventKind::Transfer).count(), 1);

        let event = transfers.next_within(Duration::from_secs(1)).await.unwrap();
        assert_eq!(event.contract, token.address());
        assert_eq!(
            event.event,
            ContractEvent::Transfer {
                from: Address::zero(),
                to: owner,
                token_id: U256::from(5),
            }
        );
        assert_eq!(
            token.token_uri(U256::from(5)).await.unwrap(),
            format!("{}5", config.fixture.base_token_uri)
        );
    }

    #[tokio::test]
    async fn test_ganache_revert_reason() {
        let (node, config) = deployed().await;
        let token = contract(&node, config.contracts.my_token.unwrap());

        let err = token.owner_of(U256::from(77)).await.unwrap_err();
        assert_eq!(err.revert_reason(), Some(reasons::NONEXISTENT_TOKEN));
    }

    #[tokio::test]
    async fn test_geth_revert_reason_on_non_owner_mint() {
        let (node, config) = deployed().await;
        node.set_revert_style(RevertStyle::Geth);
        let outsider = accounts()[1];
        let token = contract(&node, config.contracts.my_token.unwrap());

        let err = token
            .mint(outsider, U256::one(), TxOptions::sender(outsider))
            .await
            .unwrap_err();

        assert!(err.is_revert());
        assert_eq!(err.revert_reason(), Some(reasons::NOT_OWNER));
        assert_eq!(token.total_supply().await.unwrap(), U256::zero());
        // Rejected at estimation, never sent
        assert!(!node.methods().iter().any(|m| m == "eth_sendTransaction"));
    }

    #[tokio::test]
    async fn test_is_owner_depends_on_caller() {
        let (node, config) = deployed().await;
        let [owner, outsider] = [accounts()[0], accounts()[1]];
        let token = contract(&node, config.contracts.my_token.unwrap());

        assert!(token.is_owner(owner).await.unwrap());
        assert!(!token.is_owner(outsider).await.unwrap());
        assert_eq!(token.owner().await.unwrap(), owner);
    }
}
