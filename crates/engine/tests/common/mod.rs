use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{Engine, Role};
use migration::MigratorTrait;

pub const ADMIN: &str = "boss";
pub const RAVI: &str = "ravi";
pub const MEENA: &str = "meena";

pub struct Fleet {
    pub engine: Engine,
    /// Same pool as `engine`, for raw SQL in tests.
    pub db: DatabaseConnection,
    pub truck: Uuid,
    pub van: Uuid,
}

/// In-memory database with one admin, two drivers and two vehicles.
pub async fn fleet() -> Fleet {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();

    engine
        .new_user(ADMIN, "secret", Some("Fleet office"), Role::Admin)
        .await
        .unwrap();
    engine
        .new_user(RAVI, "secret", Some("Ravi Kumar"), Role::Driver)
        .await
        .unwrap();
    engine
        .new_user(MEENA, "secret", None, Role::Driver)
        .await
        .unwrap();

    let truck = engine
        .register_vehicle("TS09AB1234", Some("Tata 407"), ADMIN)
        .await
        .unwrap()
        .id;
    let van = engine
        .register_vehicle("TS09CD5678", None, ADMIN)
        .await
        .unwrap()
        .id;

    Fleet {
        engine,
        db,
        truck,
        van,
    }
}
