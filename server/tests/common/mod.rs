#![allow(dead_code)]

use diesel::prelude::*;
use eatinn_core::{IngredientEntry, InstructionStep, Recipe, Timing};
use eatinn_server::db::{self, DbPool, PoolSettings};
use eatinn_server::RecipeStore;
use std::time::Duration;

/// Connects to `TEST_DATABASE_URL` and empties every recipe table.
/// Returns `None` (and says so) when no test database is configured.
pub fn test_pool() -> Option<DbPool> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping database test");
        return None;
    };
    let settings = PoolSettings {
        max_connections: 4,
        idle_timeout: None,
        connection_timeout: Duration::from_secs(5),
    };
    let pool = db::create_pool(&url, &settings).expect("test database should be reachable");
    let mut conn = pool.get().expect("pool should hand out a connection");
    diesel::sql_query("TRUNCATE recipes, ingredients, equipment RESTART IDENTITY CASCADE")
        .execute(&mut conn)
        .expect("truncate should succeed");
    Some(pool)
}

pub fn test_store() -> Option<RecipeStore> {
    test_pool().map(RecipeStore::new)
}

pub fn count(pool: &DbPool, sql: &str) -> i64 {
    #[derive(QueryableByName)]
    struct Count {
        #[diesel(sql_type = diesel::sql_types::BigInt)]
        n: i64,
    }
    let mut conn = pool.get().expect("pool should hand out a connection");
    diesel::sql_query(sql)
        .get_result::<Count>(&mut conn)
        .expect("count query should succeed")
        .n
}

pub fn ingredient(name: &str, amount: &str, unit: &str) -> IngredientEntry {
    IngredientEntry {
        ingredient: name.to_string(),
        amount: amount.to_string(),
        unit: unit.to_string(),
        optional: false,
    }
}

pub fn step(number: i32, text: &str, images: &[&str]) -> InstructionStep {
    InstructionStep {
        step_number: number,
        text: text.to_string(),
        notes: String::new(),
        image_urls: images.iter().map(|s| s.to_string()).collect(),
    }
}

/// A fully populated recipe with its collections already in read-back order.
pub fn beef_stew() -> Recipe {
    Recipe {
        name: "Beef Stew".to_string(),
        description: "Slow and hearty".to_string(),
        ingredients: vec![
            ingredient("beef chuck", "2", "lb"),
            ingredient("carrot", "3", ""),
            IngredientEntry {
                optional: true,
                ..ingredient("parsley", "1", "bunch")
            },
            ingredient("salt", "1", "tsp"),
        ],
        required_equipment: vec!["dutch oven".to_string(), "knife".to_string()],
        instructions: vec![
            step(1, "Brown the beef.", &["https://img.example/brown.jpg"]),
            InstructionStep {
                notes: "Low heat".to_string(),
                ..step(
                    2,
                    "Simmer for two hours.",
                    &["https://img.example/simmer-1.jpg", "https://img.example/simmer-2.jpg"],
                )
            },
            step(5, "Season and serve.", &[]),
        ],
        notes: "Better the next day".to_string(),
        display_url: "https://img.example/stew.jpg".to_string(),
        source_url: "https://recipes.example/stew".to_string(),
        prep_time: Timing::from_minutes(20),
        active_time: Timing::from_minutes(150),
        public: true,
        servings: 6,
        ..Default::default()
    }
}

pub fn simple(name: &str) -> Recipe {
    Recipe {
        name: name.to_string(),
        servings: 2,
        ..Default::default()
    }
}
