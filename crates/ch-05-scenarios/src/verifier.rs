//! # Verifier Extension Suite
//!
//! Role and metadata checks on `SolnSquareVerifier`, a plain mint, then one
//! proof submission that mints the next token.

use crate::common::{contract_owner, is_mint_of, role_and_metadata};
use crate::runner::{expect_eq, Scenario, ScenarioReport};
use ch_03_contracts::SquareVerifierToken;
use ch_04_fixture::TestFixture;
use shared_bus::EventFilter;
use shared_types::{EventKind, TxOptions, U256};
use std::time::Duration;
use tracing::info;

/// Suite name used in reports.
pub const SUITE: &str = "SolnSquareVerifier";

fn verifier(fixture: &TestFixture) -> &(dyn SquareVerifierToken + 'static) {
    &*fixture.soln_square_verifier
}

/// Run the suite against `fixture.soln_square_verifier`.
pub async fn run(fixture: &TestFixture, timeout: Duration) -> ScenarioReport {
    let mut scenario = Scenario::new(SUITE, fixture, timeout);

    role_and_metadata(&mut scenario, verifier).await;
    contract_owner(&mut scenario, verifier).await;

    scenario
        .step("mint() the first token to the owner", |ctx| async move {
            let f = ctx.fixture;
            let contract = &f.soln_square_verifier;
            let token_id = f.first_token_id;
            let mut transfers = contract.subscribe(EventFilter::kinds(vec![EventKind::Transfer]));

            ctx.call(
                "mint(owner, first)",
                contract.mint(f.owner, token_id, TxOptions::sender(f.owner)),
            )
            .await?;
            let owner = f.owner;
            ctx.event("Transfer of the first token", &mut transfers, move |e| {
                is_mint_of(&e.event, owner, token_id)
            })
            .await?;

            let supply = ctx.call("totalSupply()", contract.total_supply()).await?;
            expect_eq("totalSupply()", U256::one(), supply)
        })
        .await;

    scenario
        .step("addSolution() verifies the proof and mints the next token", |ctx| async move {
            let f = ctx.fixture;
            let contract = &f.soln_square_verifier;
            let token_id = f.first_token_id + U256::one();
            let mut transfers = contract.subscribe(EventFilter::kinds(vec![EventKind::Transfer]));

            let receipt = ctx
                .call(
                    "addSolution(proof, input, owner, first + 1)",
                    contract.add_solution(
                        &f.proof,
                        &f.input,
                        f.owner,
                        token_id,
                        TxOptions::sender(f.owner),
                    ),
                )
                .await?;
            info!(
                tx_hash = ?receipt.tx_hash,
                gas_used = %receipt.gas_used,
                solutions = receipt.events_of(EventKind::SolutionAdded).count(),
                "Solution submitted"
            );

            let owner = f.owner;
            ctx.event("Transfer of the solution token", &mut transfers, move |e| {
                is_mint_of(&e.event, owner, token_id)
            })
            .await?;

            let supply = ctx.call("totalSupply()", contract.total_supply()).await?;
            expect_eq("totalSupply()", U256::from(2), supply)?;

            let holder = ctx.call("ownerOf(first + 1)", contract.owner_of(token_id)).await?;
            expect_eq("ownerOf(first + 1)", f.owner, holder)
        })
        .await;

    scenario.finish()
}
