//! Universal tagger: footprint area, relative location keywords and
//! season inference. Runs on every request regardless of the
//! requested tagger list.

use async_trait::async_trait;
use chrono::{Datelike as _, NaiveDate};
use geotag_database::postgis;
use geotag_tagger_models::{Reference, TAG_SEPARATOR, TaggerOptions};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::DatabaseValue;

use super::{TagContext, Tagger, has_results};
use crate::TagError;

const REFERENCES: &[Reference] = &[Reference {
    dataset: "Coastline",
    author: "Natural Earth",
    license: "Free of Charge",
    url: "http://www.naturalearthdata.com/downloads/10m-physical-vectors/10m-coastline/",
}];

const EQUATOR: &str = "LINESTRING(-180 0,180 0)";
const TROPICS: &str = "POLYGON((-180 -23.43731,-180 23.43731,180 23.43731,180 -23.43731,-180 -23.43731))";
const NORTHERN: &str = "POLYGON((-180 0,-180 90,180 90,180 0,-180 0))";
const SOUTHERN: &str = "POLYGON((-180 0,-180 -90,180 -90,180 0,-180 0))";

pub struct AlwaysTagger;

#[async_trait]
impl Tagger for AlwaysTagger {
    fn references(&self) -> &'static [Reference] {
        REFERENCES
    }

    async fn tag(
        &self,
        ctx: &TagContext<'_>,
        _options: &TaggerOptions,
    ) -> Result<serde_json::Map<String, serde_json::Value>, TagError> {
        let mut keywords = self.locations(ctx).await?;

        // Coastal and season keywords only make sense on Earth.
        if ctx.planet == "earth" {
            if self.is_coastal(ctx).await? {
                keywords.push(location_keyword("coastal"));
            }

            if let Some(timestamp) = ctx.timestamp
                && let Some((month, day)) = month_day(timestamp)
            {
                let southern = keywords.contains(&location_keyword("southern"));
                keywords.push(format!(
                    "season{TAG_SEPARATOR}{}",
                    season(month, day, southern)
                ));
            }
        }

        let mut content = serde_json::Map::new();
        content.insert("area".to_string(), serde_json::json!(ctx.area));
        content.insert("keywords".to_string(), serde_json::json!(keywords));
        Ok(content)
    }
}

impl AlwaysTagger {
    /// Relative location keywords. The hemisphere is decided by
    /// majority intersection area so a footprint straddling the
    /// equator still gets exactly one hemisphere keyword.
    async fn locations(&self, ctx: &TagContext<'_>) -> Result<Vec<String>, TagError> {
        let mut locations = Vec::new();
        let footprint = postgis::geom_from_text("$1");
        let params = &[DatabaseValue::String(ctx.geometry.to_string())];

        if has_results(
            ctx.db,
            &format!(
                "SELECT 1 WHERE ST_Crosses(ST_GeomFromText('{EQUATOR}', 4326), {footprint}) LIMIT 1"
            ),
            params,
        )
        .await?
        {
            locations.push(location_keyword("equatorial"));
        }

        if ctx.planet == "earth"
            && has_results(
                ctx.db,
                &format!(
                    "SELECT 1 WHERE ST_Contains(ST_GeomFromText('{TROPICS}', 4326), {footprint}) LIMIT 1"
                ),
                params,
            )
            .await?
        {
            locations.push(location_keyword("tropical"));
        }

        let rows = ctx
            .db
            .query_raw_params(
                &format!(
                    "SELECT {northern} as northern, {southern} as southern",
                    northern = postgis::area(&format!(
                        "ST_Intersection({footprint}, ST_GeomFromText('{NORTHERN}', 4326))"
                    )),
                    southern = postgis::area(&format!(
                        "ST_Intersection({footprint}, ST_GeomFromText('{SOUTHERN}', 4326))"
                    )),
                ),
                params,
            )
            .await?;

        if let Some(row) = rows.first() {
            let northern = row.to_value::<Option<f64>>("northern").unwrap_or(None).unwrap_or(0.0);
            let southern = row.to_value::<Option<f64>>("southern").unwrap_or(None).unwrap_or(0.0);
            locations.push(location_keyword(hemisphere(northern, southern)));
        }

        Ok(locations)
    }

    async fn is_coastal(&self, ctx: &TagContext<'_>) -> Result<bool, TagError> {
        let footprint = postgis::geom_from_text("$1");
        has_results(
            ctx.db,
            &format!(
                "SELECT gid FROM datasources.coastlines WHERE ST_Crosses({footprint}, geom) OR ST_Contains({footprint}, geom)"
            ),
            &[DatabaseValue::String(ctx.geometry.to_string())],
        )
        .await
    }
}

fn location_keyword(name: &str) -> String {
    format!("location{TAG_SEPARATOR}{name}")
}

/// Majority hemisphere, ties resolved to northern.
fn hemisphere(northern_area: f64, southern_area: f64) -> &'static str {
    if southern_area > northern_area {
        "southern"
    } else {
        "northern"
    }
}

/// Month and day from an ISO-8601 date, `None` when unparseable.
fn month_day(timestamp: &str) -> Option<(u32, u32)> {
    let date = NaiveDate::parse_from_str(timestamp.get(..10)?, "%Y-%m-%d").ok()?;
    Some((date.month(), date.day()))
}

/// Astronomical season for the given date, inverted for the southern
/// hemisphere.
fn season(month: u32, day: u32, southern: bool) -> &'static str {
    if in_season(month, day, 3, 6) {
        if southern { "autumn" } else { "spring" }
    } else if in_season(month, day, 6, 9) {
        if southern { "winter" } else { "summer" }
    } else if in_season(month, day, 9, 12) {
        if southern { "spring" } else { "autumn" }
    } else if southern {
        "summer"
    } else {
        "winter"
    }
}

/// Seasons start on the 21st of their boundary months.
fn in_season(month: u32, day: u32, start: u32, end: u32) -> bool {
    (month > start && month < end) || (month == start && day > 20) || (month == end && day < 21)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn northern_seasons() {
        assert_eq!(season(1, 15, false), "winter");
        assert_eq!(season(3, 20, false), "winter");
        assert_eq!(season(3, 21, false), "spring");
        assert_eq!(season(4, 1, false), "spring");
        assert_eq!(season(6, 20, false), "spring");
        assert_eq!(season(6, 21, false), "summer");
        assert_eq!(season(8, 15, false), "summer");
        assert_eq!(season(9, 20, false), "summer");
        assert_eq!(season(9, 21, false), "autumn");
        assert_eq!(season(12, 20, false), "autumn");
        assert_eq!(season(12, 21, false), "winter");
    }

    #[test]
    fn southern_inversion() {
        for (month, day) in [(1, 15), (3, 21), (6, 21), (9, 21), (12, 21), (7, 4)] {
            let north = season(month, day, false);
            let south = season(month, day, true);
            let expected = match north {
                "spring" => "autumn",
                "summer" => "winter",
                "autumn" => "spring",
                _ => "summer",
            };
            assert_eq!(south, expected, "{month}/{day}");
        }
    }

    #[test]
    fn hemisphere_majority() {
        assert_eq!(hemisphere(100.0, 50.0), "northern");
        assert_eq!(hemisphere(50.0, 100.0), "southern");
        // Ties go north.
        assert_eq!(hemisphere(42.0, 42.0), "northern");
    }

    #[test]
    fn month_day_parsing() {
        assert_eq!(month_day("2024-06-21"), Some((6, 21)));
        assert_eq!(month_day("2024-06-21T10:30:00Z"), Some((6, 21)));
        assert_eq!(month_day("not-a-date"), None);
        assert_eq!(month_day(""), None);
    }
}
