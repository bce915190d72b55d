//! # Reviews
//!
//! Guest reviews attached to menu items.
//!
//! | Key          | Type          | Description                                 |
//! |--------------|---------------|---------------------------------------------|
//! | `next_id`    | `u64`         | Board-wide auto-increment review id         |
//! | `items[id]`  | `Vec<Review>` | Reviews for one menu item, newest first     |
//!
//! Only items known to the catalog have a slot; anything else is
//! [`Error::UnknownItem`]. A review with blank text is ignored rather than
//! rejected. Likes are a toggle per liker: liking twice takes the like back.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::{Error, Result};

/// Author shown when a review is posted without a name.
pub const ANONYMOUS_AUTHOR: &str = "Guest";

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Review {
    pub id: u64,
    pub author: String,
    /// Star rating, always within `MIN_RATING..=MAX_RATING`.
    pub rating: u8,
    pub comment: String,
    pub likes: u32,
    pub posted_at: DateTime<Utc>,
    #[serde(skip)]
    liked_by: BTreeSet<String>,
}

impl Review {
    pub fn is_liked_by(&self, liker: &str) -> bool {
        self.liked_by.contains(liker)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ReviewBoard {
    items: HashMap<String, Vec<Review>>,
    next_id: u64,
}

impl ReviewBoard {
    /// An empty board with one slot per catalog entry.
    pub fn for_catalog(catalog: &dyn Catalog) -> Self {
        Self {
            items: catalog
                .entries()
                .iter()
                .map(|entry| (entry.id.clone(), Vec::new()))
                .collect(),
            next_id: 1,
        }
    }

    /// Reviews for `item_id`, newest first.
    pub fn reviews(&self, item_id: &str) -> Result<&[Review]> {
        self.items
            .get(item_id)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownItem(item_id.to_string()))
    }

    /// Mean rating to one decimal, or `None` when there are no reviews.
    pub fn average_rating(&self, item_id: &str) -> Result<Option<f32>> {
        let reviews = self.reviews(item_id)?;
        if reviews.is_empty() {
            return Ok(None);
        }
        let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
        let mean = sum as f32 / reviews.len() as f32;
        Ok(Some((mean * 10.0).round() / 10.0))
    }

    /// Post a review. Blank text is ignored and yields `Ok(None)`; the rating
    /// is clamped into range.
    pub fn add_review(
        &mut self,
        item_id: &str,
        author: Option<&str>,
        rating: u8,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<&Review>> {
        let reviews = self
            .items
            .get_mut(item_id)
            .ok_or_else(|| Error::UnknownItem(item_id.to_string()))?;

        let comment = comment.trim();
        if comment.is_empty() {
            debug!(item_id, "blank review ignored");
            return Ok(None);
        }

        let author = author
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(ANONYMOUS_AUTHOR);

        let id = self.next_id;
        self.next_id += 1;
        reviews.insert(
            0,
            Review {
                id,
                author: author.to_string(),
                rating: rating.clamp(MIN_RATING, MAX_RATING),
                comment: comment.to_string(),
                likes: 0,
                posted_at: now,
                liked_by: BTreeSet::new(),
            },
        );
        info!(item_id, review_id = id, "review posted");
        Ok(reviews.first())
    }

    /// Like `review_id` on behalf of `liker`, or take the like back if
    /// `liker` already liked it.
    pub fn toggle_like(&mut self, item_id: &str, review_id: u64, liker: &str) -> Result<&Review> {
        let review = self
            .items
            .get_mut(item_id)
            .ok_or_else(|| Error::UnknownItem(item_id.to_string()))?
            .iter_mut()
            .find(|r| r.id == review_id)
            .ok_or_else(|| Error::ReviewNotFound {
                item_id: item_id.to_string(),
                review_id,
            })?;

        if review.liked_by.remove(liker) {
            review.likes = review.likes.saturating_sub(1);
        } else {
            review.liked_by.insert(liker.to_string());
            review.likes = review.likes.saturating_add(1);
        }
        debug!(item_id, review_id, likes = review.likes, "review like toggled");
        Ok(&*review)
    }

    /// Give every item the three house reviews, aged relative to `now`.
    pub fn seed_demo(&mut self, now: DateTime<Utc>) {
        let seeds: [(&str, &str, u32, i64); 3] = [
            (
                "Lauralee Quintero",
                "Loving this recipe! So many delicious recipes to choose from.",
                356,
                30,
            ),
            (
                "Benny Spanbauer",
                "Makes meal planning a breeze. Easy to find dishes by ingredient.",
                283,
                90,
            ),
            (
                "Janetta Ratolo",
                "Clear descriptions and photos make it easy to pick something amazing.",
                194,
                14,
            ),
        ];

        let mut ids: Vec<&String> = self.items.keys().collect();
        ids.sort();
        let ids: Vec<String> = ids.into_iter().cloned().collect();

        for item_id in ids {
            for (author, comment, likes, age_days) in seeds {
                let review = Review {
                    id: self.next_id,
                    author: author.to_string(),
                    rating: MAX_RATING,
                    comment: comment.to_string(),
                    likes,
                    posted_at: now - Duration::days(age_days),
                    liked_by: BTreeSet::new(),
                };
                self.next_id += 1;
                if let Some(reviews) = self.items.get_mut(&item_id) {
                    reviews.push(review);
                }
            }
        }
    }
}
