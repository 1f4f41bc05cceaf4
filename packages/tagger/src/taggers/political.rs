//! Political tagger: continent / country / region / state hierarchy
//! with optional per-state toponym attachment.
//!
//! Countries are grouped under lazily created continent nodes in
//! overlay order (largest intersection first). State rows are matched
//! to their owning country through the ISO-A3 name table; rows whose
//! country is absent from the tree are dropped silently.

use async_trait::async_trait;
use geotag_database::postgis;
use geotag_tagger_models::{
    Reference, TAG_SEPARATOR, TaggerOptions, ToponymsMode,
    countries::country_name,
    political::{Continent, Country, Region, State, StateToponym, continent_geoname_id},
    toponyms::{MAIN_PLACE_CODES, PLACE_CODES},
};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use super::{TagContext, Tagger};
use crate::{TagError, coverage};

const REFERENCES: &[Reference] = &[
    Reference {
        dataset: "Admin level 0 - Countries",
        author: "Natural Earth",
        license: "Free of Charge",
        url: "http://www.naturalearthdata.com/downloads/10m-cultural-vectors/10m-admin-0-countries/",
    },
    Reference {
        dataset: "Admin level 1 - States, Provinces",
        author: "Natural Earth",
        license: "Free of Charge",
        url: "http://www.naturalearthdata.com/downloads/10m-cultural-vectors/10m-admin-1-states-provinces/",
    },
];

pub struct PoliticalTagger;

#[async_trait]
impl Tagger for PoliticalTagger {
    fn planet(&self) -> Option<&'static str> {
        Some("earth")
    }

    fn references(&self) -> &'static [Reference] {
        REFERENCES
    }

    async fn tag(
        &self,
        ctx: &TagContext<'_>,
        options: &TaggerOptions,
    ) -> Result<serde_json::Map<String, serde_json::Value>, TagError> {
        let mut continents = Vec::new();

        if options.limit_to_continents {
            self.add_continents(ctx, &mut continents).await?;
        } else {
            self.add_countries(ctx, &mut continents).await?;
            if !options.limit_to_countries {
                self.add_states(ctx, options, &mut continents).await?;
            }
        }

        let mut content = serde_json::Map::new();
        content.insert(
            "political".to_string(),
            serde_json::json!({ "continents": continents }),
        );
        Ok(content)
    }
}

impl PoliticalTagger {
    async fn add_continents(
        &self,
        ctx: &TagContext<'_>,
        continents: &mut Vec<Continent>,
    ) -> Result<(), TagError> {
        let rows = ctx
            .db
            .query_raw_params(
                &format!(
                    "{cte} SELECT continent, normalize_initcap(continent) as continentid, {area} as area, {entityarea} as entityarea FROM prequery, datasources.continents WHERE st_intersects(geom_simple, {corrected}) ORDER BY area DESC",
                    cte = postgis::corrected_geometry_cte("$1"),
                    area = postgis::area(&postgis::intersection("geom_simple", postgis::CORRECTED_GEOMETRY)),
                    entityarea = postgis::area("geom_simple"),
                    corrected = postgis::CORRECTED_GEOMETRY,
                ),
                &[DatabaseValue::String(ctx.geometry.to_string())],
            )
            .await?;

        for row in &rows {
            let name = row.to_value::<Option<String>>("continent").unwrap_or(None).unwrap_or_default();
            let normalized = row
                .to_value::<Option<String>>("continentid")
                .unwrap_or(None)
                .unwrap_or_default();
            continents.push(continent_node(&name, &normalized));
        }

        Ok(())
    }

    async fn add_countries(
        &self,
        ctx: &TagContext<'_>,
        continents: &mut Vec<Continent>,
    ) -> Result<(), TagError> {
        let rows = ctx
            .db
            .query_raw_params(
                &format!(
                    "{cte} SELECT name as name, concat(normalize_initcap(name), '{sep}', geonameid) as id, continent as continent, normalize_initcap(continent) as continentid, {area} as area, {entityarea} as entityarea FROM prequery, datasources.countries WHERE st_intersects(geom, {corrected}) ORDER BY area DESC",
                    cte = postgis::corrected_geometry_cte("$1"),
                    sep = TAG_SEPARATOR,
                    area = postgis::area(&postgis::intersection("geom", postgis::CORRECTED_GEOMETRY)),
                    entityarea = postgis::area("geom"),
                    corrected = postgis::CORRECTED_GEOMETRY,
                ),
                &[DatabaseValue::String(ctx.geometry.to_string())],
            )
            .await?;

        for row in &rows {
            let country = CountryRow {
                name: row.to_value::<Option<String>>("name").unwrap_or(None).unwrap_or_default(),
                id: row.to_value::<Option<String>>("id").unwrap_or(None).unwrap_or_default(),
                continent: row
                    .to_value::<Option<String>>("continent")
                    .unwrap_or(None)
                    .unwrap_or_default(),
                continent_id: row
                    .to_value::<Option<String>>("continentid")
                    .unwrap_or(None)
                    .unwrap_or_default(),
                area: row.to_value::<Option<f64>>("area").unwrap_or(None).unwrap_or(0.0),
                entity_area: row.to_value::<Option<f64>>("entityarea").unwrap_or(None).unwrap_or(0.0),
            };
            attach_country(continents, &country, ctx.area);
        }

        Ok(())
    }

    async fn add_states(
        &self,
        ctx: &TagContext<'_>,
        options: &TaggerOptions,
        continents: &mut Vec<Continent>,
    ) -> Result<(), TagError> {
        let rows = ctx
            .db
            .query_raw_params(
                &format!(
                    "{cte} SELECT region, name as state, concat(normalize_initcap(name), '{sep}', geonameid) as stateid, normalize_initcap(region) as regionid, adm0_a3 as isoa3, {area} as area, {entityarea} as entityarea, {intersection} as intersection, iso_a2 FROM prequery, datasources.states WHERE st_intersects(geom, {corrected}) ORDER BY area DESC",
                    cte = postgis::corrected_geometry_cte("$1"),
                    sep = TAG_SEPARATOR,
                    area = postgis::area(&postgis::intersection("geom", postgis::CORRECTED_GEOMETRY)),
                    entityarea = postgis::area("geom"),
                    intersection = postgis::as_wkt(&postgis::intersection("geom", postgis::CORRECTED_GEOMETRY)),
                    corrected = postgis::CORRECTED_GEOMETRY,
                ),
                &[DatabaseValue::String(ctx.geometry.to_string())],
            )
            .await?;

        for row in &rows {
            let state_row = StateRow {
                region: row.to_value::<Option<String>>("region").unwrap_or(None),
                state: row.to_value::<Option<String>>("state").unwrap_or(None).unwrap_or_default(),
                state_id: row.to_value::<Option<String>>("stateid").unwrap_or(None).unwrap_or_default(),
                region_id: row.to_value::<Option<String>>("regionid").unwrap_or(None),
                iso_a3: row.to_value::<Option<String>>("isoa3").unwrap_or(None).unwrap_or_default(),
                iso_a2: row.to_value::<Option<String>>("iso_a2").unwrap_or(None).unwrap_or_default(),
                area: row.to_value::<Option<f64>>("area").unwrap_or(None).unwrap_or(0.0),
                entity_area: row.to_value::<Option<f64>>("entityarea").unwrap_or(None).unwrap_or(0.0),
            };

            let Some(mut state) = state_from_row(&state_row, ctx.area) else {
                continue;
            };

            let slot = match state_row.region_id.as_deref() {
                None | Some("") => RegionSlot::Anonymous,
                Some(region_id) => {
                    match self.region_info(ctx, region_id, &state_row.iso_a2).await? {
                        Some(info) => {
                            let region_area = coverage::to_square_km(info.area);
                            let pcover = coverage::percentage(region_area, ctx.area);
                            if pcover <= 0.0 {
                                // Region coverage is insignificant, so
                                // its states are too.
                                continue;
                            }
                            RegionSlot::Known {
                                name: state_row.region.clone().unwrap_or_default(),
                                id: format!("region{TAG_SEPARATOR}{}", info.id),
                                pcover,
                                gcover: coverage::percentage(
                                    region_area,
                                    coverage::to_square_km(info.entity_area),
                                ),
                            }
                        }
                        // The admin-1 region is absent from the regions
                        // table; keep the node with sentinel coverage.
                        None => RegionSlot::Unranked {
                            name: state_row.region.clone().unwrap_or_default(),
                            id: format!("region{TAG_SEPARATOR}{region_id}"),
                        },
                    }
                }
            };

            if options.toponyms.is_some()
                && let Some(intersection) =
                    row.to_value::<Option<String>>("intersection").unwrap_or(None)
            {
                state.toponyms = Some(
                    self.state_toponyms(ctx, options, &intersection).await?,
                );
            }

            attach_state(continents, &state_row.iso_a3, slot, state);
        }

        Ok(())
    }

    async fn region_info(
        &self,
        ctx: &TagContext<'_>,
        normalized: &str,
        iso_a2: &str,
    ) -> Result<Option<RegionInfo>, TagError> {
        let rows = ctx
            .db
            .query_raw_params(
                &format!(
                    "{cte} SELECT concat(normalize_initcap(name), '{sep}', geonameid) as regionid, {area} as regionarea, {entityarea} as regionentityarea FROM prequery, datasources.regions WHERE normalize_initcap(name)=$2 AND iso_a2=$3 LIMIT 1",
                    cte = postgis::corrected_geometry_cte("$1"),
                    sep = TAG_SEPARATOR,
                    area = postgis::area(&postgis::intersection("geom", postgis::CORRECTED_GEOMETRY)),
                    entityarea = postgis::area("geom"),
                ),
                &[
                    DatabaseValue::String(ctx.geometry.to_string()),
                    DatabaseValue::String(normalized.to_string()),
                    DatabaseValue::String(iso_a2.to_string()),
                ],
            )
            .await?;

        Ok(rows.first().map(|row| RegionInfo {
            id: row.to_value::<Option<String>>("regionid").unwrap_or(None).unwrap_or_default(),
            area: row.to_value::<Option<f64>>("regionarea").unwrap_or(None).unwrap_or(0.0),
            entity_area: row
                .to_value::<Option<f64>>("regionentityarea")
                .unwrap_or(None)
                .unwrap_or(0.0),
        }))
    }

    /// Populated places inside the intersected part of a state,
    /// capitals first then by decreasing population. The extended code
    /// set is only honored below the area limit.
    async fn state_toponyms(
        &self,
        ctx: &TagContext<'_>,
        options: &TaggerOptions,
        intersection_wkt: &str,
    ) -> Result<Vec<StateToponym>, TagError> {
        let codes = if options.toponyms == Some(ToponymsMode::All)
            && coverage::is_valid_area(ctx.area, ctx.config.area_limit)
        {
            PLACE_CODES
        } else {
            MAIN_PLACE_CODES
        };
        let codes = codes
            .iter()
            .map(|code| format!("'{code}'"))
            .collect::<Vec<_>>()
            .join(", ");

        fetch_state_toponyms(ctx.db, &codes, intersection_wkt).await
    }
}

async fn fetch_state_toponyms(
    db: &dyn Database,
    codes: &str,
    intersection_wkt: &str,
) -> Result<Vec<StateToponym>, TagError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT name, longitude, latitude, fcode, population FROM gazetteer.geoname WHERE st_intersects(geom, ST_GeomFromText($1, 4326)) AND fcode IN ({codes}) ORDER BY CASE fcode WHEN 'PPLC' then 1 WHEN 'PPLG' then 2 WHEN 'PPLA' then 3 WHEN 'PPLA2' then 4 WHEN 'PPLA4' then 5 WHEN 'PPL' then 6 ELSE 7 END ASC, population DESC"
            ),
            &[DatabaseValue::String(intersection_wkt.to_string())],
        )
        .await?;

    let mut toponyms = Vec::with_capacity(rows.len());
    for row in &rows {
        toponyms.push(StateToponym {
            name: row.to_value::<Option<String>>("name").unwrap_or(None).unwrap_or_default(),
            lon: row.to_value::<Option<f64>>("longitude").unwrap_or(None).unwrap_or(0.0),
            lat: row.to_value::<Option<f64>>("latitude").unwrap_or(None).unwrap_or(0.0),
            fcode: row.to_value::<Option<String>>("fcode").unwrap_or(None).unwrap_or_default(),
            population: row.to_value::<Option<i64>>("population").unwrap_or(None).unwrap_or(0),
        });
    }
    Ok(toponyms)
}

/// One decoded admin-0 overlay row.
pub(crate) struct CountryRow {
    pub name: String,
    /// `<normalized>:<geonameid>` synthesized by the overlay query.
    pub id: String,
    pub continent: String,
    pub continent_id: String,
    pub area: f64,
    pub entity_area: f64,
}

/// One decoded admin-1 overlay row.
pub(crate) struct StateRow {
    pub region: Option<String>,
    pub state: String,
    pub state_id: String,
    pub region_id: Option<String>,
    pub iso_a3: String,
    pub iso_a2: String,
    pub area: f64,
    pub entity_area: f64,
}

struct RegionInfo {
    id: String,
    area: f64,
    entity_area: f64,
}

/// Region placement for a state row.
pub(crate) enum RegionSlot {
    /// No admin-1 region; states collect in the per-country anonymous
    /// bucket.
    Anonymous,
    /// Region resolved from the regions table with coverage figures.
    Known {
        name: String,
        id: String,
        pcover: f64,
        gcover: f64,
    },
    /// Region named by the state row but absent from the regions
    /// table; coverage is reported as -1.
    Unranked { name: String, id: String },
}

fn continent_node(name: &str, normalized: &str) -> Continent {
    let geonameid = continent_geoname_id(normalized)
        .map_or_else(String::new, |id| id.to_string());
    Continent {
        name: name.to_string(),
        id: format!("continent{TAG_SEPARATOR}{normalized}{TAG_SEPARATOR}{geonameid}"),
        countries: Vec::new(),
    }
}

/// Attaches a country row to its continent, creating the continent
/// node on first sight. Countries with insignificant coverage are
/// dropped but still force continent creation, matching overlay order.
pub(crate) fn attach_country(continents: &mut Vec<Continent>, row: &CountryRow, footprint_area: f64) {
    let index = continents
        .iter()
        .position(|continent| continent.name == row.continent)
        .unwrap_or_else(|| {
            continents.push(continent_node(&row.continent, &row.continent_id));
            continents.len() - 1
        });

    let area = coverage::to_square_km(row.area);
    let pcover = coverage::percentage(area, footprint_area);
    if pcover > 0.0 {
        continents[index].countries.push(Country {
            name: row.name.clone(),
            id: format!("country{TAG_SEPARATOR}{}", row.id),
            pcover,
            gcover: coverage::percentage(area, coverage::to_square_km(row.entity_area)),
            regions: Vec::new(),
        });
    }
}

/// Builds a state node from an overlay row, or `None` when its
/// footprint coverage truncates to zero.
pub(crate) fn state_from_row(row: &StateRow, footprint_area: f64) -> Option<State> {
    let area = coverage::to_square_km(row.area);
    let pcover = coverage::percentage(area, footprint_area);
    if pcover <= 0.0 {
        return None;
    }
    Some(State {
        name: row.state.clone(),
        id: format!("state{TAG_SEPARATOR}{}", row.state_id),
        pcover,
        gcover: coverage::percentage(area, coverage::to_square_km(row.entity_area)),
        toponyms: None,
    })
}

/// Attaches a state to its country's region bucket. The country is
/// located through the ISO-A3 name table; rows whose country is not in
/// the tree are dropped silently.
pub(crate) fn attach_state(
    continents: &mut Vec<Continent>,
    iso_a3: &str,
    slot: RegionSlot,
    state: State,
) {
    let Some(name) = country_name(iso_a3) else {
        return;
    };

    for continent in continents {
        if let Some(country) = continent
            .countries
            .iter_mut()
            .find(|country| country.name == name)
        {
            region_bucket(&mut country.regions, slot).states.push(state);
            return;
        }
    }
}

fn region_bucket(regions: &mut Vec<Region>, slot: RegionSlot) -> &mut Region {
    let index = match &slot {
        RegionSlot::Anonymous => regions.iter().position(|region| region.id.is_none()),
        RegionSlot::Known { id, .. } | RegionSlot::Unranked { id, .. } => {
            regions.iter().position(|region| region.id.as_deref() == Some(id))
        }
    };

    let index = index.unwrap_or_else(|| {
        regions.push(match slot {
            RegionSlot::Anonymous => Region::anonymous(),
            RegionSlot::Known {
                name,
                id,
                pcover,
                gcover,
            } => Region {
                name: Some(name),
                id: Some(id),
                pcover: Some(pcover),
                gcover: Some(gcover),
                states: Vec::new(),
            },
            RegionSlot::Unranked { name, id } => Region {
                name: Some(name),
                id: Some(id),
                pcover: Some(-1.0),
                gcover: Some(-1.0),
                states: Vec::new(),
            },
        });
        regions.len() - 1
    });

    &mut regions[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn france_row() -> CountryRow {
        CountryRow {
            name: "France".to_string(),
            id: "France:3017382".to_string(),
            continent: "Europe".to_string(),
            continent_id: "Europe".to_string(),
            area: 50e6,
            entity_area: 643_801e6,
        }
    }

    fn state_row(state: &str, region: Option<&str>) -> StateRow {
        StateRow {
            region: region.map(str::to_string),
            state: state.to_string(),
            state_id: format!("{state}:123"),
            region_id: region.map(str::to_string),
            iso_a3: "FRA".to_string(),
            iso_a2: "FR".to_string(),
            area: 25e6,
            entity_area: 100e6,
        }
    }

    #[test]
    fn country_creates_continent_with_geonameid() {
        let mut continents = Vec::new();
        attach_country(&mut continents, &france_row(), 100.0);
        assert_eq!(continents.len(), 1);
        assert_eq!(continents[0].id, "continent:Europe:6255148");
        assert_eq!(continents[0].countries.len(), 1);
        assert_eq!(continents[0].countries[0].id, "country:France:3017382");
        assert!((continents[0].countries[0].pcover - 50.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_continent_gets_empty_geonameid() {
        let mut continents = Vec::new();
        let mut row = france_row();
        row.continent = "Atlantis".to_string();
        row.continent_id = "Atlantis".to_string();
        attach_country(&mut continents, &row, 100.0);
        assert_eq!(continents[0].id, "continent:Atlantis:");
    }

    #[test]
    fn insignificant_country_dropped_but_continent_kept() {
        let mut continents = Vec::new();
        let mut row = france_row();
        row.area = 1.0;
        attach_country(&mut continents, &row, 100_000.0);
        assert_eq!(continents.len(), 1);
        assert!(continents[0].countries.is_empty());
    }

    #[test]
    fn countries_share_continent_node() {
        let mut continents = Vec::new();
        attach_country(&mut continents, &france_row(), 100.0);
        let mut swiss = france_row();
        swiss.name = "Switzerland".to_string();
        swiss.id = "Switzerland:2658434".to_string();
        attach_country(&mut continents, &swiss, 100.0);
        assert_eq!(continents.len(), 1);
        assert_eq!(continents[0].countries.len(), 2);
    }

    #[test]
    fn state_row_coverage_gate() {
        assert!(state_from_row(&state_row("Normandie", None), 100.0).is_some());
        let mut tiny = state_row("Normandie", None);
        tiny.area = 1.0;
        assert!(state_from_row(&tiny, 100_000.0).is_none());
    }

    #[test]
    fn state_attaches_under_known_region() {
        let mut continents = Vec::new();
        attach_country(&mut continents, &france_row(), 100.0);

        let row = state_row("Calvados", Some("Normandie"));
        let state = state_from_row(&row, 100.0).unwrap();
        attach_state(
            &mut continents,
            "FRA",
            RegionSlot::Known {
                name: "Normandie".to_string(),
                id: "region:Normandie:3793170".to_string(),
                pcover: 25.0,
                gcover: 3.0,
            },
            state,
        );

        let regions = &continents[0].countries[0].regions;
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].id.as_deref(), Some("region:Normandie:3793170"));
        assert_eq!(regions[0].states.len(), 1);
        assert_eq!(regions[0].states[0].id, "state:Calvados:123");
    }

    #[test]
    fn states_share_region_bucket() {
        let mut continents = Vec::new();
        attach_country(&mut continents, &france_row(), 100.0);

        for name in ["Calvados", "Manche"] {
            let row = state_row(name, Some("Normandie"));
            let state = state_from_row(&row, 100.0).unwrap();
            attach_state(
                &mut continents,
                "FRA",
                RegionSlot::Known {
                    name: "Normandie".to_string(),
                    id: "region:Normandie:3793170".to_string(),
                    pcover: 25.0,
                    gcover: 3.0,
                },
                state,
            );
        }

        let regions = &continents[0].countries[0].regions;
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].states.len(), 2);
    }

    #[test]
    fn anonymous_bucket_for_regionless_states() {
        let mut continents = Vec::new();
        attach_country(&mut continents, &france_row(), 100.0);

        let row = state_row("Terres australes", None);
        let state = state_from_row(&row, 100.0).unwrap();
        attach_state(&mut continents, "FRA", RegionSlot::Anonymous, state);

        let regions = &continents[0].countries[0].regions;
        assert_eq!(regions.len(), 1);
        assert!(regions[0].id.is_none());
        assert!(regions[0].pcover.is_none());
        assert_eq!(regions[0].states.len(), 1);
    }

    #[test]
    fn unranked_region_reports_negative_cover() {
        let mut continents = Vec::new();
        attach_country(&mut continents, &france_row(), 100.0);

        let row = state_row("Calvados", Some("Normandie"));
        let state = state_from_row(&row, 100.0).unwrap();
        attach_state(
            &mut continents,
            "FRA",
            RegionSlot::Unranked {
                name: "Normandie".to_string(),
                id: "region:Normandie".to_string(),
            },
            state,
        );

        let regions = &continents[0].countries[0].regions;
        assert_eq!(regions[0].pcover, Some(-1.0));
        assert_eq!(regions[0].gcover, Some(-1.0));
    }

    #[test]
    fn state_for_unknown_country_dropped() {
        let mut continents = Vec::new();
        attach_country(&mut continents, &france_row(), 100.0);

        let row = state_row("Nowhere", None);
        let state = state_from_row(&row, 100.0).unwrap();
        attach_state(&mut continents, "XXX", RegionSlot::Anonymous, state);
        assert!(continents[0].countries[0].regions.is_empty());
    }
}
