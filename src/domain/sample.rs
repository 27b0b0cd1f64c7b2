//! Built-in starter catalog.
//!
//! Fresh sessions start from these three materials so there is something to
//! browse before anyone uploads.

use chrono::{Duration, Utc};
use uuid::Uuid;

use super::identity::Identity;
use super::material::{AverageRating, Comment, Material, MaterialId, Rating};

/// Seed comments get fixed ids so every run produces the same catalog
fn comment(seq: u128, text: &str, user: Identity) -> Comment {
    Comment {
        id: Uuid::from_u128(seq),
        ..Comment::new(text, user)
    }
}

fn rating(user_id: &str, score: u8) -> Rating {
    Rating {
        user_id: user_id.to_string(),
        rating: score,
    }
}

/// The starter catalog, newest first.
///
/// Average ratings are computed from the ratings rather than hard-coded.
pub fn sample_catalog() -> Vec<Material> {
    let now = Utc::now();
    let john = Identity::new("1", "John Doe");
    let jane = Identity::new("2", "Jane Smith");
    let robert = Identity::new("3", "Robert Johnson");
    let sarah = Identity::new("4", "Sarah Wilson");

    let mut materials = vec![
        Material {
            id: MaterialId::new("1"),
            title: "Introduction to React".to_string(),
            subject: "Computer Science".to_string(),
            category: "Programming".to_string(),
            description: "A comprehensive guide to React fundamentals".to_string(),
            file_url: "#".to_string(),
            file_name: "intro-to-react.pdf".to_string(),
            uploaded_by: john.clone(),
            created_at: now,
            views: 120,
            downloads: 45,
            comments: vec![comment(1, "This was really helpful, thanks!", jane.clone())],
            ratings: vec![rating("2", 5), rating("3", 4)],
            average_rating: AverageRating::Unrated,
        },
        Material {
            id: MaterialId::new("2"),
            title: "Advanced Calculus Notes".to_string(),
            subject: "Mathematics".to_string(),
            category: "Calculus".to_string(),
            description: "Detailed notes on advanced calculus topics".to_string(),
            file_url: "#".to_string(),
            file_name: "advanced-calculus.pdf".to_string(),
            uploaded_by: jane,
            created_at: now - Duration::hours(26),
            views: 85,
            downloads: 32,
            comments: Vec::new(),
            ratings: vec![rating("1", 4), rating("4", 3)],
            average_rating: AverageRating::Unrated,
        },
        Material {
            id: MaterialId::new("3"),
            title: "Organic Chemistry Lab Guide".to_string(),
            subject: "Chemistry".to_string(),
            category: "Laboratory".to_string(),
            description: "Step-by-step guide for organic chemistry lab experiments".to_string(),
            file_url: "#".to_string(),
            file_name: "organic-chem-lab.pdf".to_string(),
            uploaded_by: robert,
            created_at: now - Duration::days(9),
            views: 210,
            downloads: 98,
            comments: vec![
                comment(2, "Saved me during finals week!", john),
                comment(3, "Could use more detail on experiment 4", sarah),
            ],
            ratings: vec![rating("1", 5), rating("2", 5), rating("4", 4)],
            average_rating: AverageRating::Unrated,
        },
    ];

    for material in &mut materials {
        material.recompute_average();
    }

    materials
}
