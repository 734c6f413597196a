//! Epic Games Store free games feed.
//!
//! The store publishes a single promotions feed per country. A title counts as
//! free when one of its promotional offers carries a discount percentage of 0
//! (the feed's way of saying "100% off").

use crate::config::settings::EgsConfig;
use crate::core::embed::Embed;
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

const STORE_PAGE_URL: &str = "https://www.epicgames.com/store/en-US/p";

#[derive(Debug, Deserialize)]
struct FeedResponse {
    data: FeedData,
}

#[derive(Debug, Deserialize)]
struct FeedData {
    #[serde(rename = "Catalog")]
    catalog: Catalog,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Catalog {
    search_store: SearchStore,
}

#[derive(Debug, Deserialize)]
struct SearchStore {
    #[serde(default)]
    elements: Vec<Element>,
}

/// One catalog entry of the promotions feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub offer_type: Option<String>,
    #[serde(default)]
    pub key_images: Vec<KeyImage>,
    #[serde(default)]
    pub seller: Option<Seller>,
    #[serde(default)]
    pub custom_attributes: Vec<CustomAttribute>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub catalog_ns: Option<CatalogNs>,
    #[serde(default)]
    pub product_slug: Option<String>,
    #[serde(default)]
    pub promotions: Option<Promotions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyImage {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Seller {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomAttribute {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub total_price: TotalPrice,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalPrice {
    pub fmt_price: FormattedPrice,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedPrice {
    pub original_price: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogNs {
    #[serde(default)]
    pub mappings: Option<Vec<PageMapping>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMapping {
    pub page_slug: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotions {
    #[serde(default)]
    pub promotional_offers: Vec<OfferGroup>,
    #[serde(default)]
    pub upcoming_promotional_offers: Vec<OfferGroup>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferGroup {
    #[serde(default)]
    pub promotional_offers: Vec<PromotionalOffer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionalOffer {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub discount_setting: DiscountSetting,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountSetting {
    pub discount_percentage: u32,
}

/// Which promotion window a listing is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionKind {
    Current,
    Upcoming,
}

impl Element {
    fn offer_groups(&self, kind: PromotionKind) -> &[OfferGroup] {
        match (&self.promotions, kind) {
            (Some(p), PromotionKind::Current) => &p.promotional_offers,
            (Some(p), PromotionKind::Upcoming) => &p.upcoming_promotional_offers,
            (None, _) => &[],
        }
    }

    fn free_offer(&self, kind: PromotionKind) -> Option<&PromotionalOffer> {
        self.offer_groups(kind)
            .iter()
            .flat_map(|group| &group.promotional_offers)
            .find(|offer| offer.discount_setting.discount_percentage == 0)
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.custom_attributes
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }
}

/// Titles free right now, in feed order.
#[must_use]
pub fn current_free_games(elements: &[Element]) -> Vec<&Element> {
    free_games(elements, PromotionKind::Current)
}

/// Titles that will become free in the next promotion window, in feed order.
#[must_use]
pub fn upcoming_free_games(elements: &[Element]) -> Vec<&Element> {
    free_games(elements, PromotionKind::Upcoming)
}

fn free_games(elements: &[Element], kind: PromotionKind) -> Vec<&Element> {
    elements
        .iter()
        .filter(|element| element.free_offer(kind).is_some())
        .collect()
}

/// The presentable facts about one free game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    pub title: String,
    pub description: Option<String>,
    pub offer_type: Option<&'static str>,
    pub key_image: Option<String>,
    pub publisher: Option<String>,
    pub developer: Option<String>,
    pub original_price: Option<String>,
    pub url: Option<String>,
    pub promotion_start: Option<DateTime<Utc>>,
    pub promotion_end: Option<DateTime<Utc>>,
}

impl GameInfo {
    #[must_use]
    pub fn from_element(element: &Element, kind: PromotionKind) -> Self {
        let offer_type = match element.offer_type.as_deref() {
            Some("BASE_GAME") => Some("Game"),
            Some("ADD_ON" | "DLC") => Some("DLC"),
            _ => None,
        };

        let image_of = |kind: &str| {
            element
                .key_images
                .iter()
                .find(|image| image.kind == kind)
                .map(|image| image.url.clone())
        };
        let key_image = image_of("DieselStoreFrontWide").or_else(|| image_of("OfferImageWide"));

        let publisher = element
            .seller
            .as_ref()
            .and_then(|seller| seller.name.clone())
            .filter(|name| !name.is_empty())
            .or_else(|| element.attribute("publisherName").map(str::to_string));

        let slug = element
            .catalog_ns
            .as_ref()
            .and_then(|ns| ns.mappings.as_ref())
            .and_then(|mappings| mappings.last())
            .map(|mapping| mapping.page_slug.as_str())
            .or(element.product_slug.as_deref())
            .filter(|slug| !slug.is_empty());

        let offer = element.free_offer(kind);

        Self {
            title: element.title.clone(),
            description: element.description.clone(),
            offer_type,
            key_image,
            publisher,
            developer: element.attribute("developerName").map(str::to_string),
            original_price: element
                .price
                .as_ref()
                .map(|price| price.total_price.fmt_price.original_price.clone()),
            url: slug.map(|slug| format!("{STORE_PAGE_URL}/{slug}")),
            promotion_start: offer.map(|o| o.start_date),
            promotion_end: offer.map(|o| o.end_date),
        }
    }
}

/// Time remaining until `end`, as `"N days, H:MM:SS"`; `"ended"` once it has passed.
///
/// The day part is dropped under one day and singular for exactly one.
#[must_use]
pub fn format_time_left(end: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = end - now;
    if remaining <= chrono::TimeDelta::zero() {
        return "ended".to_string();
    }

    let days = remaining.num_days();
    let secs = remaining.num_seconds() - days * 86_400;
    let clock = format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}

/// Embed for one game. `color` is usually the key image's dominant colour.
#[must_use]
pub fn game_embed(info: &GameInfo, color: Option<u32>, now: DateTime<Utc>) -> Embed {
    let not_listed = || "N/A".to_string();

    let mut embed = Embed::new()
        .author(&info.title, info.url.clone(), None)
        .field("Developer", info.developer.clone().unwrap_or_else(not_listed), true)
        .field("Publisher", info.publisher.clone().unwrap_or_else(not_listed), true)
        .field("Offer Type", info.offer_type.unwrap_or("N/A"), true)
        .field(
            "Original Price",
            info.original_price.clone().unwrap_or_else(not_listed),
            true,
        );

    if let Some(description) = info.description.as_deref().filter(|d| !d.is_empty()) {
        embed = embed.description(description);
    }
    if let Some(image) = &info.key_image {
        embed = embed.image(image);
    }
    if let Some(color) = color {
        embed = embed.color(color);
    }
    if let Some(end) = info.promotion_end {
        let starts = info
            .promotion_start
            .filter(|start| *start > now)
            .map(|start| format!("Starts {}. ", start.format("%d/%m/%Y")))
            .unwrap_or_default();
        embed = embed.footer(
            format!(
                "{starts}Valid until {}.  {} left.",
                end.format("%d/%m/%Y"),
                format_time_left(end, now)
            ),
            None,
        );
    }
    embed
}

/// Builds the promotions feed URL for a country.
#[must_use]
pub fn feed_url(base: &str, locale: &str, country: &str) -> String {
    format!("{base}?locale={locale}&country={country}&allowCountries={country}")
}

/// HTTP client for the promotions feed and its artwork.
#[derive(Debug, Clone)]
pub struct EgsClient {
    http: Client,
    promotions_url: String,
    locale: String,
    default_country: String,
}

impl EgsClient {
    #[must_use]
    pub fn new(config: &EgsConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    #[must_use]
    pub fn with_client(http: Client, config: &EgsConfig) -> Self {
        Self {
            http,
            promotions_url: config.promotions_url.clone(),
            locale: config.locale.clone(),
            default_country: config.default_country.to_uppercase(),
        }
    }

    #[must_use]
    pub fn default_country(&self) -> &str {
        &self.default_country
    }

    /// Fetches every catalog element of the feed for `country`.
    #[instrument(skip(self))]
    pub async fn fetch_elements(&self, country: &str) -> Result<Vec<Element>> {
        let url = feed_url(&self.promotions_url, &self.locale, country);
        let response = self.http.get(&url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                service: "Epic Games Store",
                status: response.status().as_u16(),
            });
        }
        let body = response.text().await?;
        let elements = parse_feed(&body)?;
        debug!("Feed for {} has {} elements", country, elements.len());
        Ok(elements)
    }

    /// Downloads an image, e.g. a key image for colour extraction.
    #[instrument(skip(self))]
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

fn parse_feed(body: &str) -> Result<Vec<Element>> {
    let feed: FeedResponse = serde_json::from_str(body)?;
    Ok(feed.data.catalog.search_store.elements)
}
