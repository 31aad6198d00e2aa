//! # ERC-721 Suite
//!
//! Ordered checks against the plain `ERC721Mintable` deployment. Later
//! steps rely on the tokens earlier steps minted.

use crate::common::{contract_owner, is_mint_of, role_and_metadata};
use crate::runner::{expect_eq, Scenario, ScenarioReport, StepFailure};
use ch_03_contracts::Erc721Mintable;
use ch_04_fixture::TestFixture;
use shared_bus::EventFilter;
use shared_types::{ContractEvent, EventKind, TxOptions, U256};
use std::time::Duration;
use tracing::{debug, warn};

/// Suite name used in reports.
pub const SUITE: &str = "ERC721Mintable";

fn my_token(fixture: &TestFixture) -> &(dyn Erc721Mintable + 'static) {
    &*fixture.my_token
}

/// Run the suite against `fixture.my_token`.
pub async fn run(fixture: &TestFixture, timeout: Duration) -> ScenarioReport {
    let mut scenario = Scenario::new(SUITE, fixture, timeout);

    role_and_metadata(&mut scenario, my_token).await;

    scenario
        .step("pause() then unpause() emit Paused and Unpaused", |ctx| async move {
            let f = ctx.fixture;
            let mut events = f
                .my_token
                .subscribe(EventFilter::kinds(vec![EventKind::Paused, EventKind::Unpaused]));

            ctx.call("pause()", f.my_token.pause(TxOptions::sender(f.owner)))
                .await?;
            ctx.call("unpause()", f.my_token.unpause(TxOptions::sender(f.owner)))
                .await?;

            let first = ctx.event("Paused", &mut events, |_| true).await?;
            expect_eq(
                "first pause event",
                ContractEvent::Paused { account: f.owner },
                first.event,
            )?;
            let second = ctx.event("Unpaused", &mut events, |_| true).await?;
            expect_eq(
                "second pause event",
                ContractEvent::Unpaused { account: f.owner },
                second.event,
            )?;

            let paused = ctx.call("paused()", f.my_token.paused()).await?;
            expect_eq("paused()", false, paused)
        })
        .await;

    scenario
        .step("mint() every token id to the owner", |ctx| async move {
            let f = ctx.fixture;
            for token_id in f.token_ids() {
                let mut transfers = f
                    .my_token
                    .subscribe(EventFilter::kinds(vec![EventKind::Transfer]));

                ctx.call(
                    &format!("mint({token_id})"),
                    f.my_token
                        .mint(f.owner, token_id, TxOptions::sender(f.owner)),
                )
                .await?;

                let owner = f.owner;
                ctx.event(&format!("Transfer of token {token_id}"), &mut transfers, move |e| {
                    is_mint_of(&e.event, owner, token_id)
                })
                .await?;
                debug!(token_id = %token_id, "Minted");
            }
            Ok(())
        })
        .await;

    scenario
        .step("totalSupply() and balanceOf(owner) count every mint", |ctx| async move {
            let f = ctx.fixture;
            let supply = ctx.call("totalSupply()", f.my_token.total_supply()).await?;
            expect_eq("totalSupply()", f.token_count(), supply)?;

            let balance = ctx
                .call("balanceOf(owner)", f.my_token.balance_of(f.owner))
                .await?;
            expect_eq("balanceOf(owner)", supply, balance)
        })
        .await;

    scenario
        .step("tokenURI() is the base URI followed by the token id", |ctx| async move {
            let f = ctx.fixture;
            for token_id in f.token_ids() {
                let what = format!("tokenURI({token_id})");
                let uri = ctx.call(&what, f.my_token.token_uri(token_id)).await?;
                expect_eq(&what, f.expected_token_uri(token_id), uri)?;
            }
            Ok(())
        })
        .await;

    scenario
        .step("approve() and transferFrom() move the first token", |ctx| async move {
            let f = ctx.fixture;
            let token_id = f.first_token_id;

            ctx.call(
                "approve(account_two, first)",
                f.my_token
                    .approve(f.account_two, token_id, TxOptions::sender(f.owner)),
            )
            .await?;
            ctx.call(
                "transferFrom(owner, account_two, first)",
                f.my_token.transfer_from(
                    f.owner,
                    f.account_two,
                    token_id,
                    TxOptions::sender(f.owner),
                ),
            )
            .await?;

            let holder = ctx.call("ownerOf(first)", f.my_token.owner_of(token_id)).await?;
            expect_eq("ownerOf(first)", f.account_two, holder)
        })
        .await;

    contract_owner(&mut scenario, my_token).await;

    scenario
        .step("mint() from a non-owner account is rejected", |ctx| async move {
            let f = ctx.fixture;
            let token_id = f.last_token_id + U256::one();
            let what = format!("mint({token_id}) from account_two");

            let before = ctx.call("totalSupply()", f.my_token.total_supply()).await?;

            match ctx
                .call(
                    &what,
                    f.my_token
                        .mint(f.account_two, token_id, TxOptions::sender(f.account_two)),
                )
                .await
            {
                Ok(_) => return Err(StepFailure::UnexpectedSuccess { what }),
                Err(StepFailure::Contract { source, .. }) if source.is_revert() => {
                    warn!(
                        reason = source.revert_reason().unwrap_or("<no reason>"),
                        "Non-owner mint rejected"
                    );
                }
                Err(other) => return Err(other),
            }

            let after = ctx.call("totalSupply()", f.my_token.total_supply()).await?;
            expect_eq("totalSupply() after rejected mint", before, after)
        })
        .await;

    scenario.finish()
}
