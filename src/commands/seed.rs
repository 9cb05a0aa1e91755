//! Seed command - Demo hotel owner, hotels and rooms for local development.

use std::sync::Arc;

use crate::config::Config;
use crate::domain::{Actor, NewHotel, NewRoom, RoomType, UserRole};
use crate::errors::AppResult;
use crate::infra::{Database, Persistence, UnitOfWork};
use crate::services::{
    AdminManager, AdminService, HotelManager, HotelService, RoomManager, RoomService,
};

pub const DEMO_OWNER_EMAIL: &str = "owner@demo.local";
const DEMO_OWNER_USERNAME: &str = "demo_owner";
const DEMO_OWNER_PASSWORD: &str = "owner123";

struct DemoHotel {
    name: &'static str,
    address: &'static str,
    city: &'static str,
    contact: &'static str,
    description: &'static str,
    rooms: &'static [(RoomType, f64, i32, &'static [&'static str])],
}

const DEMO_HOTELS: &[DemoHotel] = &[
    DemoHotel {
        name: "Seaside Retreat",
        address: "12 Calangute Beach Road",
        city: "Goa",
        contact: "+91 832 555 0101",
        description: "Beachfront rooms a short walk from the market.",
        rooms: &[
            (RoomType::DoubleBed, 3500.0, 2, &["WiFi", "Air Conditioning", "Sea View"]),
            (RoomType::Suite, 7800.0, 4, &["WiFi", "Pool Access", "Sea View", "Mini Bar"]),
        ],
    },
    DemoHotel {
        name: "Hillcrest Lodge",
        address: "4 Mall Road",
        city: "Shimla",
        contact: "+91 177 555 0142",
        description: "Quiet lodge with valley views.",
        rooms: &[
            (RoomType::SingleBed, 1800.0, 1, &["WiFi", "Room Heater"]),
            (RoomType::Deluxe, 4200.0, 3, &["WiFi", "Room Heater", "Mountain View"]),
        ],
    },
    DemoHotel {
        name: "The Grand Marine",
        address: "88 Marine Drive",
        city: "Mumbai",
        contact: "+91 22 5555 0199",
        description: "City hotel on the promenade.",
        rooms: &[
            (RoomType::DoubleBed, 5200.0, 2, &["WiFi", "Air Conditioning", "Gym"]),
            (
                RoomType::PresidentialSuite,
                25000.0,
                4,
                &["WiFi", "Butler", "Sea View", "Pool Access"],
            ),
        ],
    },
];

/// Execute the seed command
pub async fn execute(config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let uow = Arc::new(Persistence::new(db.get_connection()));

    let created = seed_demo_data(uow).await?;
    if created == 0 {
        tracing::info!("Demo data already present, nothing to do");
    } else {
        tracing::info!(
            hotels = created,
            owner = DEMO_OWNER_EMAIL,
            password = DEMO_OWNER_PASSWORD,
            "Demo data seeded"
        );
    }
    Ok(())
}

/// Insert the demo catalog once. Returns the number of hotels created.
pub async fn seed_demo_data<U: UnitOfWork>(uow: Arc<U>) -> AppResult<usize> {
    if uow.users().find_by_email(DEMO_OWNER_EMAIL).await?.is_some() {
        return Ok(0);
    }

    let owner = AdminManager::new(uow.clone())
        .create_user(
            DEMO_OWNER_USERNAME.to_string(),
            DEMO_OWNER_EMAIL.to_string(),
            DEMO_OWNER_PASSWORD.to_string(),
            UserRole::HotelOwner,
        )
        .await?;
    let actor = Actor::new(owner.id, owner.role);

    let hotels = HotelManager::new(uow.clone());
    let rooms = RoomManager::new(uow);

    for demo in DEMO_HOTELS {
        let hotel = hotels
            .create_hotel(
                actor,
                NewHotel {
                    name: demo.name.to_string(),
                    address: demo.address.to_string(),
                    city: demo.city.to_string(),
                    contact: demo.contact.to_string(),
                    description: demo.description.to_string(),
                    owner_id: owner.id,
                    images: Vec::new(),
                },
            )
            .await?;

        for (room_type, price, max_guests, amenities) in demo.rooms {
            rooms
                .create_room(
                    actor,
                    NewRoom {
                        hotel_id: hotel.id,
                        room_type: *room_type,
                        price_per_night: *price,
                        amenities: amenities.iter().map(|a| a.to_string()).collect(),
                        images: Vec::new(),
                        max_guests: *max_guests,
                        description: format!("{} at {}", room_type, demo.name),
                    },
                )
                .await?;
        }
    }

    Ok(DEMO_HOTELS.len())
}
