//! Runs the favorites scenarios against the configured cluster. The favorites program must already
//! be deployed there.

use client::{
    e2e_helpers::E2e,
    logs::log_header,
    pretty::favorites::PrettyFavorites,
    transactions::ChainClient,
};
use favorites_interface::state::Favorites;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let rpc = ChainClient::from_env()?;

    log_header("Set favorites");
    let e2e = E2e::new_funded_user(rpc).await?;
    e2e.set_favorites(23, "red").await?;
    let favorites = e2e.view_favorites().await?;
    print!("{}", PrettyFavorites { address: &e2e.favorites.favorites, favorites: &favorites });
    assert_eq!(favorites, Favorites::new(23, "red"));

    log_header("Update both fields");
    e2e.update_favorites(Some(57), Some("blue")).await?;
    assert_eq!(e2e.view_favorites().await?, Favorites::new(57, "blue"));

    log_header("Update the number only");
    let e2e = E2e::new_funded_user(e2e.rpc).await?;
    e2e.set_favorites(7, "blue").await?;
    e2e.update_favorites(Some(109), None).await?;
    assert_eq!(e2e.view_favorites().await?, Favorites::new(109, "blue"));

    log_header("Update the color only");
    let e2e = E2e::new_funded_user(e2e.rpc).await?;
    e2e.set_favorites(7, "blue").await?;
    e2e.update_favorites(None, Some("green")).await?;
    let favorites = e2e.view_favorites().await?;
    print!("{}", PrettyFavorites { address: &e2e.favorites.favorites, favorites: &favorites });
    assert_eq!(favorites, Favorites::new(7, "green"));

    Ok(())
}
