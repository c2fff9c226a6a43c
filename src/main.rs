use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use framing_storefront::catalog::{Cart, Catalog, InMemoryCart, InMemoryCatalog};
use framing_storefront::config::StorefrontConfig;
use framing_storefront::domain::order::{
    Address, ItemDetails, OrderKind, OrderWizard, PersonalInfo, PhotoFile, PickupSlot, WizardCommand, WizardController,
    WizardHandle,
};
use framing_storefront::gateway::{SimulatedOrderService, SubmissionGateway};
use framing_storefront::metrics::{self, Metrics};
use framing_storefront::tracking::{AuthFrame, OrderTracker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO, crate at DEBUG; override with RUST_LOG
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,framing_storefront=debug")),
        )
        .init();

    let config = StorefrontConfig::from_env()?;
    tracing::info!(
        timeout_ms = config.submission_timeout.as_millis(),
        "Starting framing storefront demo"
    );

    // === 1. Metrics ===
    let metrics = Arc::new(Metrics::new()?);
    if let Some(port) = config.metrics_port {
        let registry = Arc::new(metrics.registry().clone());
        std::thread::spawn(move || {
            let system = actix_web::rt::System::new();
            if let Err(e) = system.block_on(metrics::serve_metrics(registry, port)) {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    }

    // === 2. Order service ===
    let service = Arc::new(SimulatedOrderService::new(config.simulated_latency));
    let gateway = SubmissionGateway::new(service.clone(), config.submission_timeout);

    // === 3. Browse the catalog ===
    let catalog = Arc::new(InMemoryCatalog::seeded());
    for product in catalog.featured_products().await? {
        tracing::info!(
            id = product.id,
            name = %product.name,
            discount = product.discount_percent(),
            "Featured product"
        );
    }
    let cart = InMemoryCart::new(catalog.clone());
    cart.add(1).await?;
    tracing::info!(items = cart.items().await?.len(), "Cart ready");

    // === 4. Garland order with pickup ===
    let wizard = OrderWizard::from_query(Some("garlands")).with_pickup_area(config.pickup_area());
    let mut garlands = WizardController::new(wizard, gateway.clone()).with_metrics(metrics.clone());

    garlands.go_next()?;
    garlands.dispatch(WizardCommand::UpdatePersonal(customer()))?;
    garlands.dispatch(WizardCommand::UpdateAddress(brooklyn()))?;
    garlands.dispatch(WizardCommand::UpdateItems(ItemDetails {
        description: "Wedding garland, marigold and rose".to_string(),
        quantity: "1".to_string(),
        notes: Some("Please keep the ribbon".to_string()),
    }))?;
    garlands.go_next()?;

    garlands.dispatch(WizardCommand::DetectCollectionMethod)?;
    if let Some(date) = garlands.pickup_dates().first().copied() {
        garlands.dispatch(WizardCommand::SetPickupDate(date))?;
    }
    garlands.dispatch(WizardCommand::SetPickupSlot(PickupSlot::TenToNoon))?;
    garlands.go_next()?;

    println!("{}", garlands.review());
    let confirmation = garlands.submit().await?;
    tracing::info!(order_id = %confirmation.order_id, next = %confirmation.next_steps, "Garland order placed");

    // === 5. Photo order through a shared handle ===
    let photos = WizardHandle::new(
        WizardController::new(OrderWizard::from_query(None), gateway).with_metrics(metrics.clone()),
    );
    photos.dispatch(WizardCommand::SelectKind(OrderKind::Photos)).await?;
    photos.dispatch(WizardCommand::Next).await?;
    photos.dispatch(WizardCommand::UpdatePersonal(customer())).await?;
    photos.dispatch(WizardCommand::UpdateAddress(brooklyn())).await?;
    photos
        .dispatch(WizardCommand::AttachPhoto(PhotoFile::new(
            "family-portrait.jpg",
            "image/jpeg",
            2_400_000,
        )))
        .await?;
    photos.dispatch(WizardCommand::Next).await?;
    let confirmation = photos.submit().await?;
    tracing::info!(order_id = %confirmation.order_id, next = %confirmation.next_steps, "Photo order placed");

    // === 6. Track the photo order ===
    let tracker = OrderTracker::new(confirmation.order_id.clone());
    let auth = AuthFrame::new("demo-user", confirmation.order_id.clone());
    tracing::debug!(frame = %auth.to_json()?, "Tracking channel auth frame");

    let (tx, rx) = tokio::sync::mpsc::channel(4);
    for status in ["Received", "In Progress"] {
        tx.send(serde_json::json!({ "status": status }).to_string()).await?;
    }
    drop(tx);
    tracker.run(rx).await;
    if let Some(status) = tracker.latest() {
        tracing::info!(title = status.title(), message = status.message(), "Order status");
    }

    tracing::info!(orders = service.orders_created(), "Demo finished");
    Ok(())
}

fn customer() -> PersonalInfo {
    PersonalInfo {
        first_name: "Sarah".to_string(),
        last_name: "Lee".to_string(),
        email: "sarah@example.com".to_string(),
        phone: "5551234567".to_string(),
    }
}

fn brooklyn() -> Address {
    Address {
        street: "48 Court St".to_string(),
        city: "Brooklyn".to_string(),
        state: "NY".to_string(),
        postal_code: "11201".to_string(),
    }
}
