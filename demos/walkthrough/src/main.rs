use std::sync::Arc;
use std::time::Duration;

use shaadisetgo::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PAGES: [&str; 5] = ["/", "/vendors/42", "/bookings", "/vendor/dashboard", "/admin/dashboard"];

fn describe(nav: &Navigation) -> String {
    match (&nav.decision, &nav.redirect) {
        (_, Some(target)) => format!("{:?} -> {target}", nav.decision),
        (Decision::ShowError { reason, .. }, None) => format!("error: {reason}"),
        (decision, None) => format!("{decision:?}"),
    }
}

fn tour<A: AuthApi, T: TokenStore>(label: &str, client: &ShaadiClient<A, T>) -> Result<(), ShaadiError> {
    let session = client.session().snapshot();
    let who = session
        .identity
        .as_ref()
        .map_or_else(|| "nobody".to_string(), |id| format!("{} ({})", id.display_name, id.role));
    println!("\n== {label}: {who}, status {}", session.status);
    for page in PAGES {
        let nav = client.navigate(page)?;
        println!("  {page:<18} {}", describe(&nav));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let backend = Arc::new(
        InMemoryAuthApi::new()
            .with_latency(Duration::from_millis(30))
            .with_account("Asha", "asha@example.com", "pw", Role::Vendor)
            .with_account("Farah", "farah@example.com", "pw", Role::Admin),
    );
    let client = ShaadiClient::builder().build(Arc::clone(&backend), MemoryTokenStore::new());

    client.boot().await;
    tour("fresh start", &client)?;

    if !client.login("asha@example.com", "wrong").await {
        let error = client.session().snapshot().last_error;
        println!("\nlogin refused: {}", error.map(|e| e.to_string()).unwrap_or_default());
    }

    let mut dashboard = client.watch("/vendor/dashboard")?;
    client.login("asha@example.com", "pw").await;
    if let Some(nav) = dashboard.changed().await {
        println!("\n/vendor/dashboard is now {}", describe(&nav));
    }
    tour("vendor", &client)?;

    // A second visit reuses the stored token.
    let token = client.session().tokens().load()?;
    let revisit = ShaadiClient::builder().build(
        Arc::clone(&backend),
        token.map(MemoryTokenStore::with_token).unwrap_or_default(),
    );
    revisit.boot().await;
    tour("revisit", &revisit)?;

    client.logout();
    backend.revoke_all();
    revisit.boot().await;
    tour("after server-side revoke", &revisit)?;

    let registered = client
        .register(
            RegistrationProfile::new("Kabir", "kabir@example.com", "pw").with_role(Role::Customer),
        )
        .await;
    tracing::info!(registered, "registration finished");
    tour("new customer", &client)?;

    Ok(())
}
