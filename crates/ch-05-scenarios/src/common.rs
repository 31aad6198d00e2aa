//! Steps both suites share: the owner role and the deed metadata.

use crate::runner::{expect_eq, Scenario};
use ch_03_contracts::Erc721Mintable;
use ch_04_fixture::TestFixture;
use shared_types::{Address, ContractEvent, TokenId};

/// Picks the contract a suite runs against out of the fixture.
pub(crate) type Select<T> = fn(&TestFixture) -> &T;

/// True for the `Transfer` that mints `token_id` to `to`.
pub(crate) fn is_mint_of(event: &ContractEvent, to: Address, token_id: TokenId) -> bool {
    matches!(
        event,
        ContractEvent::Transfer { from, to: recipient, token_id: id }
            if from.is_zero() && *recipient == to && *id == token_id
    )
}

/// `isOwner()` from the owner account, then `name()`, `symbol()` and
/// `baseTokenURI()` against the fixture literals.
pub(crate) async fn role_and_metadata<'f, T>(scenario: &mut Scenario<'f>, select: Select<T>)
where
    T: Erc721Mintable + ?Sized + 'static,
{
    scenario
        .step("isOwner() is true for the owner account", move |ctx| async move {
            let contract = select(ctx.fixture);
            let is_owner = ctx
                .call("isOwner()", contract.is_owner(ctx.fixture.owner))
                .await?;
            expect_eq("isOwner()", true, is_owner)
        })
        .await;

    scenario
        .step("name() matches", move |ctx| async move {
            let name = ctx.call("name()", select(ctx.fixture).name()).await?;
            expect_eq("name()", ctx.fixture.name.as_str(), name.as_str())
        })
        .await;

    scenario
        .step("symbol() matches", move |ctx| async move {
            let symbol = ctx.call("symbol()", select(ctx.fixture).symbol()).await?;
            expect_eq("symbol()", ctx.fixture.symbol.as_str(), symbol.as_str())
        })
        .await;

    scenario
        .step("baseTokenURI() matches", move |ctx| async move {
            let uri = ctx
                .call("baseTokenURI()", select(ctx.fixture).base_token_uri())
                .await?;
            expect_eq(
                "baseTokenURI()",
                ctx.fixture.base_token_uri.as_str(),
                uri.as_str(),
            )
        })
        .await;
}

/// `owner()` is the deploying account.
pub(crate) async fn contract_owner<'f, T>(scenario: &mut Scenario<'f>, select: Select<T>)
where
    T: Erc721Mintable + ?Sized + 'static,
{
    scenario
        .step("owner() is the deploying account", move |ctx| async move {
            let owner = ctx.call("owner()", select(ctx.fixture).owner()).await?;
            expect_eq("owner()", ctx.fixture.owner, owner)
        })
        .await;
}
