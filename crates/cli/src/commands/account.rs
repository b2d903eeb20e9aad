//! Session commands.

use secrecy::SecretString;
use shopwise_client::Result;
use shopwise_client::services::Account;

use super::Context;

pub async fn login(ctx: &Context, email: &str, password: String) -> Result<()> {
    let user = Account::new(ctx.state.clone())
        .sign_in(email, &SecretString::from(password))
        .await?;
    let cart = ctx.state.cart();
    tracing::info!(
        "Logged in as {} <{}>. {} item(s) in cart.",
        user.name,
        user.email,
        cart.total_item_count()
    );
    Ok(())
}

pub fn logout(ctx: &Context) {
    if ctx.state.session().is_authenticated() {
        ctx.state.session().logout();
        tracing::info!("Logged out.");
    } else {
        tracing::info!("Not logged in.");
    }
}

pub async fn register(ctx: &Context, name: &str, email: &str, password: String) -> Result<()> {
    let message = Account::new(ctx.state.clone())
        .register(name, email, SecretString::from(password))
        .await?;
    tracing::info!("{message}");
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    if !ctx.state.session().is_authenticated() {
        tracing::info!("Not logged in.");
        return Ok(());
    }
    let profile = Account::new(ctx.state.clone()).profile().await?;
    tracing::info!("{} <{}>", profile.name, profile.email);
    Ok(())
}
