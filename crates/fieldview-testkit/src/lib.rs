// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use fieldview_app::{Dataset, DatasetKind, DatasetRegistry, Record};
use std::path::PathBuf;
use time::macros::format_description;
use time::{Date, Duration, Month, OffsetDateTime, Time};

const REFERENCE_YEAR: i32 = 2024;

const PRODUCT_NAMES: [&str; 16] = [
    "Shoe", "Shirt", "Hat", "Scarf", "Jacket", "Sock", "Belt", "Glove", "Boot", "Sandal", "Hoodie",
    "Vest", "Coat", "Cap", "Sweater", "Shorts",
];
const PRODUCT_ADJECTIVES: [&str; 8] = [
    "Classic", "Trail", "Summer", "Winter", "Urban", "Vintage", "Sport", "Everyday",
];
const PRODUCT_CATEGORIES: [&str; 4] = ["Footwear", "Apparel", "Accessories", "Outerwear"];

const PAGE_TOPICS: [&str; 12] = [
    "Home", "About", "Pricing", "Contact", "Careers", "Blog", "Docs", "Support", "Security",
    "Changelog", "Partners", "Legal",
];
const PAGE_STATUSES: [&str; 3] = ["draft", "published", "archived"];

const PLAN_TIERS: [&str; 6] = [
    "Starter",
    "Basic",
    "Team",
    "Business",
    "Enterprise",
    "Nonprofit",
];
const PLAN_PERIODS: [&str; 2] = ["monthly", "yearly"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Deterministic generator for the three demo catalogs.
#[derive(Debug, Clone)]
pub struct CatalogFaker {
    rng: DeterministicRng,
}

impl CatalogFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn product(&mut self, id: i64) -> Record {
        let name = format!(
            "{} {}",
            self.pick(&PRODUCT_ADJECTIVES),
            self.pick(&PRODUCT_NAMES)
        );
        let price = self.int_range_i64(5, 250);
        let category = self.pick(&PRODUCT_CATEGORIES);
        let created = self.datetime_in_year(REFERENCE_YEAR);
        Record::new(id)
            .with_field("name", name)
            .with_field("price", price)
            .with_field("category", category)
            .with_field("createdAt", timestamp(created))
    }

    pub fn page(&mut self, id: i64) -> Record {
        let topic = self.pick(&PAGE_TOPICS);
        let status = self.pick(&PAGE_STATUSES);
        let published = self.datetime_in_year(REFERENCE_YEAR - 1);
        let updated = published + Duration::days(self.int_range_i64(1, 300));
        Record::new(id)
            .with_field("title", topic)
            .with_field("slug", format!("/{}", topic.to_ascii_lowercase()))
            .with_field("status", status)
            .with_field("publishedAt", timestamp(published))
            .with_field("updatedAt", timestamp(updated))
    }

    pub fn price_plan(&mut self, id: i64) -> Record {
        let tier = self.pick(&PLAN_TIERS);
        let period = self.pick(&PLAN_PERIODS);
        let monthly = self.int_range_i64(0, 99);
        let price = if period == "yearly" {
            monthly * 10
        } else {
            monthly
        };
        let active = if self.rng.bool() { "true" } else { "false" };
        let created = self.datetime_in_year(REFERENCE_YEAR);
        Record::new(id)
            .with_field("description", format!("{tier} {period}"))
            .with_field("active", active)
            .with_field("price", price)
            .with_field("createdAt", timestamp(created))
    }

    pub fn datasets(&mut self, rows_per_dataset: usize) -> Result<Vec<Dataset>> {
        let count = rows_per_dataset as i64;
        let products = (1..=count).map(|id| self.product(id)).collect();
        let pages = (1..=count).map(|id| self.page(id)).collect();
        let plans = (1..=count).map(|id| self.price_plan(id)).collect();
        Ok(vec![
            Dataset::new(DatasetKind::Products, products).context("build demo products")?,
            Dataset::new(DatasetKind::Pages, pages).context("build demo pages")?,
            Dataset::new(DatasetKind::PricePlans, plans).context("build demo price plans")?,
        ])
    }

    pub fn datetime_in_year(&mut self, year: i32) -> OffsetDateTime {
        let start = midnight_utc(year, Month::January, 1);
        let seconds = self.int_range_i64(0, 365 * 24 * 60 * 60 - 1);
        let tenths = self.int_range_i64(0, 9);
        start + Duration::seconds(seconds) + Duration::milliseconds(tenths * 100)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

/// Renders `YYYY-MM-DDTHH:MM:SS.fZ`, the shape the table shows as a date.
pub fn timestamp(value: OffsetDateTime) -> String {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:1]Z"
    );
    value.format(&format).expect("format demo timestamp")
}

/// The two-product catalog used throughout the docs and tests.
pub fn sample_products() -> Result<Dataset> {
    Dataset::new(
        DatasetKind::Products,
        vec![
            Record::new(1)
                .with_field("name", "Shoe")
                .with_field("price", 10_i64),
            Record::new(2)
                .with_field("name", "Shirt")
                .with_field("price", 20_i64),
        ],
    )
}

pub fn sample_pages() -> Result<Dataset> {
    Dataset::new(
        DatasetKind::Pages,
        vec![
            Record::new(1)
                .with_field("title", "Home")
                .with_field("updatedAt", "2023-05-09T14:22:31.5Z"),
            Record::new(2)
                .with_field("title", "Pricing")
                .with_field("updatedAt", "not-a-date"),
        ],
    )
}

pub fn sample_registry() -> Result<DatasetRegistry> {
    DatasetRegistry::new(vec![sample_products()?, sample_pages()?])
}

pub fn write_data_file(json: &str) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("datasets.json");
    std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    Ok((dir, path))
}

/// Products as a bare array and Pages with a search field override. Kept as
/// literal text so record keys stay in document order.
pub fn sample_data_json() -> String {
    r#"{
  "Products": [
    {"id": 1, "name": "Shoe", "price": 10},
    {"id": 2, "name": "Shirt", "price": 20}
  ],
  "Pages": {
    "search_field": "slug",
    "records": [
      {"id": 1, "title": "Home", "slug": "/", "updatedAt": "2023-05-09T14:22:31.5Z"}
    ]
  }
}"#
    .to_owned()
}

fn midnight_utc(year: i32, month: Month, day: u8) -> OffsetDateTime {
    let date = Date::from_calendar_date(year, month, day).expect("valid calendar date");
    let midnight = Time::from_hms(0, 0, 0).expect("valid midnight");
    date.with_time(midnight).assume_utc()
}
