//! Hotel dashboard example: current orders and room management on one repository

use serde_json::json;
use stayboard::prelude::*;

fn seed(repository: &InMemoryRepository) -> Result<()> {
    repository.insert(EntityKind::Shop, json!({"id": "SH1", "name": "Happy Paws Spa"}))?;
    repository.insert(
        EntityKind::Service,
        json!({"id": "S1", "name": "Bath", "shop_id": "SH1", "price": 150000.0}),
    )?;
    repository.insert(
        EntityKind::Service,
        json!({"id": "S2", "name": "Haircut", "shop_id": "SH1", "price": 200000.0}),
    )?;
    repository.insert(
        EntityKind::Appointment,
        json!({
            "id": "A1",
            "customer_id": "C1",
            "status": "NoProgress",
            "start_time": "2025-03-02T09:00:00Z",
            "created_at": "2025-03-02T06:00:00Z"
        }),
    )?;
    repository.insert(
        EntityKind::ServiceAppointment,
        json!({"id": "SA1", "appointment_id": "A1", "service_id": "S1"}),
    )?;
    repository.insert(
        EntityKind::ServiceAppointment,
        json!({"id": "SA2", "appointment_id": "A1", "service_id": "S2"}),
    )?;

    repository.insert(
        EntityKind::Customer,
        json!({"account_id": "C1", "full_name": "Lan Nguyen"}),
    )?;
    repository.insert(EntityKind::Hotel, json!({"id": "H1", "name": "Sunny Pet Hotel"}))?;
    repository.insert(
        EntityKind::Room,
        json!({"id": "R1", "room_number": "101", "room_type": 3, "hotel_id": "H1"}),
    )?;
    repository.insert(
        EntityKind::RoomBooking,
        json!({
            "id": "B1",
            "room_detail_id": "R1",
            "customer_id": "C1",
            "check_in_date": "2025-03-01T00:00:00Z",
            "check_out_date": "2025-03-03T00:00:00Z",
            "total_night": 2,
            "total_amount": 800000.0,
            "status": 1
        }),
    )?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AggregatorConfig::default_config();
    config.logging.init()?;

    println!("🏨 Stayboard Hotel Dashboard Example\n");

    let repository = InMemoryRepository::new();
    seed(&repository)?;

    let now = "2025-03-02T12:00:00Z".parse::<DateTime<Utc>>()?;
    let screen = ViewAggregator::new(Arc::new(repository), config)
        .with_clock(Arc::new(FixedClock::new(now)));

    println!("📋 Current orders\n");
    let orders = screen.current_orders(&OrderFilter::for_customer("C1")).await?;
    for order in &orders {
        println!(
            "  {} [{}] {} total={} ({}, {})",
            order.appointment_id,
            order.badge.label,
            screen.shop_name(order).await,
            order.total_amount,
            order.schedule.relative,
            order.schedule.absolute,
        );
    }
    for (category, count) in screen.order_counts() {
        println!("  {}: {}", category.as_str(), count);
    }

    println!("\n🛏️  Room bookings\n");
    let filter = BookingFilter::for_hotel("H1");
    for row in screen.room_bookings(&filter).await? {
        println!(
            "  {} {} @ {} [{}] {}%",
            row.customer_name, row.room_label, row.hotel_name, row.badge.label, row.progress
        );
    }

    println!("\n✅ Checking in B1...");
    let confirmed = screen.check_in("B1").await?;
    println!("  B1 is now {}", confirmed.status.as_str());

    for row in screen.room_bookings(&filter).await? {
        println!("  {} [{}] {}%", row.room_label, row.badge.label, row.progress);
    }

    match screen.check_in("B1").await {
        Ok(_) => println!("  unexpected second check-in"),
        Err(e) => println!("\n⛔ Second check-in rejected: {}", e.to_response().message),
    }

    screen.unmount();
    println!("\n👋 Done");
    Ok(())
}
