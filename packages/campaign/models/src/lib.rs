#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Campaign domain row types.
//!
//! These structs represent the shapes of data as stored in and retrieved
//! from the `PostGIS` database. They carry no query logic — all persistence
//! operations live in `field_mapper_database`, which takes an explicit
//! database handle per call.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A registered user, identified by their OSM account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary key.
    pub id: i32,
    /// OpenStreetMap username (unique).
    pub osm_user_id: String,
    /// Contact email, if provided.
    pub email: Option<String>,
}

/// Fields that can be changed on an existing [`User`].
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New OSM username.
    pub osm_user_id: Option<String>,
    /// New contact email.
    pub email: Option<String>,
}

/// A field-data collection campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    /// Primary key.
    pub id: i32,
    /// User who created the campaign.
    pub creator_id: i32,
    /// Campaign name (unique).
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// First day the campaign is active.
    pub start_date: NaiveDateTime,
    /// Last day the campaign is active.
    pub end_date: NaiveDateTime,
    /// When the campaign record was created.
    pub created_on: NaiveDateTime,
    /// Whether the campaign links out to an OpenMapKit deployment.
    pub link_to_openmapkit: bool,
    /// Schema version of the campaign payload.
    pub version: Option<i32>,
    /// Stable external identifier.
    pub uuid: String,
    /// Identifiers of linked remote projects, if any.
    pub remote_projects: Option<String>,
    /// Base map type shown in the campaign UI.
    pub map_type: Option<String>,
    /// Path to the campaign thumbnail image, if one was generated.
    pub thumbnail: Option<String>,
}

/// Fields that can be changed on an existing [`Campaign`].
#[derive(Debug, Clone, Default)]
pub struct CampaignUpdate {
    /// New campaign name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New start date.
    pub start_date: Option<NaiveDateTime>,
    /// New end date.
    pub end_date: Option<NaiveDateTime>,
}

/// Parameters for creating a new [`Campaign`].
///
/// The UUID and creation timestamp are assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewCampaign {
    /// User creating the campaign.
    pub creator_id: i32,
    /// Campaign name (must be unique).
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// First day the campaign is active.
    pub start_date: NaiveDateTime,
    /// Last day the campaign is active.
    pub end_date: NaiveDateTime,
    /// Whether the campaign links out to an OpenMapKit deployment.
    pub link_to_openmapkit: bool,
    /// Schema version of the campaign payload.
    pub version: Option<i32>,
    /// Identifiers of linked remote projects, if any.
    pub remote_projects: Option<String>,
    /// Base map type shown in the campaign UI.
    pub map_type: Option<String>,
}

/// Parameters for creating a campaign feature type together with the tag
/// attributes it collects.
#[derive(Debug, Clone)]
pub struct NewFeatureType {
    /// OSM feature class (e.g. `"building"`).
    pub feature: String,
    /// Display name.
    pub name: Option<String>,
    /// OSM tag keys collected for this type.
    pub tags: Vec<String>,
}

/// Parameters for selecting an insight function for a campaign.
#[derive(Debug, Clone)]
pub struct NewInsightFunction {
    /// Function name.
    pub name: String,
    /// OSM feature class the function operates on.
    pub feature: Option<String>,
    /// Name of the feature type the function is bound to; resolved to the
    /// latest feature type of that name at save time.
    pub feature_type_name: String,
}

/// A direct chat message between two users within a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Primary key.
    pub id: i32,
    /// Campaign the conversation belongs to.
    pub campaign_id: i32,
    /// Sending user.
    pub sender_id: i32,
    /// Receiving user.
    pub receiver_id: i32,
    /// Message body.
    pub message: String,
    /// When the message was sent.
    pub send_time: NaiveDateTime,
    /// Whether the receiver has seen the message.
    pub delivered: bool,
}

/// A campaign notification raised by a user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Primary key.
    pub id: i32,
    /// Campaign the notification belongs to.
    pub campaign_id: i32,
    /// User whose action raised the notification.
    pub sender_id: i32,
    /// Notification text.
    pub message: String,
    /// When the notification was raised.
    pub sent_at: NaiveDateTime,
    /// Whether the notification has been delivered.
    pub delivered: bool,
}

/// A category of map object collected during a campaign (buildings,
/// roads, ...), optionally reusable as a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureType {
    /// Primary key.
    pub id: i32,
    /// OSM feature class this type maps (e.g. `"building"`).
    pub feature: String,
    /// Display name.
    pub name: Option<String>,
    /// Whether this type is offered as a reusable template.
    pub is_template: bool,
}

/// A named, described template wrapping a [`FeatureType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTemplate {
    /// Primary key.
    pub id: i32,
    /// Template name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Feature type the template wraps.
    pub feature_type_id: Option<i32>,
}

/// A tag attribute collected for a feature type (e.g. `building:levels`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Primary key.
    pub id: i32,
    /// OSM tag key.
    pub name: String,
}

/// A polygonal task area inside a campaign.
///
/// The polygon itself stays in `PostGIS`; fetch it as `GeoJSON` via the
/// boundary repository when needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBoundary {
    /// Primary key.
    pub id: i32,
    /// Campaign the boundary belongs to.
    pub campaign_id: i32,
    /// Area name.
    pub name: Option<String>,
    /// Mapping status of the area.
    pub status: Option<String>,
    /// Boundary geometry kind from the uploaded `GeoJSON`
    /// (e.g. `"FeatureCollection"`).
    pub boundary_type: Option<String>,
}

/// A team of users assigned to one task boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Primary key.
    pub id: i32,
    /// Team name.
    pub name: String,
    /// Task boundary the team works.
    pub boundary_id: i32,
}

/// An insight function selected for a campaign, computing a statistic
/// over one of its feature types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightFunction {
    /// Primary key.
    pub id: i32,
    /// Function name.
    pub name: String,
    /// OSM feature class the function operates on.
    pub feature: Option<String>,
    /// Feature type the function is bound to.
    pub feature_type_id: i32,
}
