//! Itinerary places and their derived values.

use fake::Dummy;
use serde::{Deserialize, Serialize};

/// Defines a place picked for the itinerary.
///
#[derive(Clone, Debug, Dummy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Place {
    /// Returns a place with only a name and an address, as entered on the
    /// command line.
    ///
    pub fn named(name: &str, address: &str) -> Self {
        Place {
            id: String::new(),
            name: name.to_owned(),
            address: address.to_owned(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }
}

/// Externally selected places, in itinerary order.
pub type SelectedPlaceList = Vec<Place>;

/// Defines a place with its position in the itinerary.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedPlace {
    #[serde(flatten)]
    pub place: Place,
    pub order: usize,
}

/// Collaborator deriving itinerary values from the selected places.
///
pub trait PlaceCollaborator {
    /// Returns the places with their itinerary position assigned.
    fn assign_order(&self, places: &[Place]) -> Vec<OrderedPlace>;

    /// Returns the region the trip takes place in.
    fn derive_area(&self, places: &[Place]) -> String;
}

/// Default collaborator: 0-based order by position and the most common
/// region among the place addresses.
///
#[derive(Clone, Copy, Debug, Default)]
pub struct ItineraryPlaces;

impl PlaceCollaborator for ItineraryPlaces {
    fn assign_order(&self, places: &[Place]) -> Vec<OrderedPlace> {
        assign_order(places)
    }

    fn derive_area(&self, places: &[Place]) -> String {
        derive_area(places)
    }
}

/// Assign a contiguous 0-based `order` to each place in sequence order.
///
pub fn assign_order(places: &[Place]) -> Vec<OrderedPlace> {
    places
        .iter()
        .enumerate()
        .map(|(order, place)| OrderedPlace {
            place: place.clone(),
            order,
        })
        .collect()
}

// (short name, accepted spellings of the leading address token)
const REGIONS: [(&str, &[&str]); 17] = [
    ("서울", &["서울특별시", "서울시", "서울"]),
    ("부산", &["부산광역시", "부산시", "부산"]),
    ("대구", &["대구광역시", "대구시", "대구"]),
    ("인천", &["인천광역시", "인천시", "인천"]),
    ("광주", &["광주광역시", "광주시", "광주"]),
    ("대전", &["대전광역시", "대전시", "대전"]),
    ("울산", &["울산광역시", "울산시", "울산"]),
    ("세종", &["세종특별자치시", "세종시", "세종"]),
    ("경기", &["경기도", "경기"]),
    ("강원", &["강원특별자치도", "강원도", "강원"]),
    ("충북", &["충청북도", "충북"]),
    ("충남", &["충청남도", "충남"]),
    ("전북", &["전북특별자치도", "전라북도", "전북"]),
    ("전남", &["전라남도", "전남"]),
    ("경북", &["경상북도", "경북"]),
    ("경남", &["경상남도", "경남"]),
    ("제주", &["제주특별자치도", "제주도", "제주"]),
];

/// Returns the short region name for an address, judged by its first token.
///
pub fn region_of(address: &str) -> Option<&'static str> {
    let token = address.split_whitespace().next()?;
    REGIONS
        .iter()
        .find(|(_, spellings)| spellings.contains(&token))
        .map(|(short, _)| *short)
}

/// Returns the most common region among the places (first seen wins ties),
/// or an empty string when none is recognized.
///
pub fn derive_area(places: &[Place]) -> String {
    let mut counts: Vec<(&'static str, usize)> = vec![];
    for region in places.iter().filter_map(|place| region_of(&place.address)) {
        match counts.iter_mut().find(|(name, _)| *name == region) {
            Some((_, count)) => *count += 1,
            None => counts.push((region, 1)),
        }
    }
    let mut best: Option<(&'static str, usize)> = None;
    for (region, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((region, count));
        }
    }
    best.map(|(region, _)| region.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{Fake, Faker};

    #[test]
    fn order_is_contiguous_and_zero_based() {
        let places: Vec<Place> = (0..4).map(|_| Faker.fake()).collect();
        let ordered = assign_order(&places);
        for (index, entry) in ordered.iter().enumerate() {
            assert_eq!(entry.order, index);
            assert_eq!(entry.place, places[index]);
        }
    }

    #[test]
    fn order_of_empty_list_is_empty() {
        assert!(assign_order(&[]).is_empty());
    }

    #[test]
    fn region_recognizes_long_and_short_names() {
        assert_eq!(region_of("서울특별시 종로구 사직로 161"), Some("서울"));
        assert_eq!(region_of("제주특별자치도 서귀포시"), Some("제주"));
        assert_eq!(region_of("경기 수원시 팔달구"), Some("경기"));
        assert_eq!(region_of("Tokyo Shibuya"), None);
        assert_eq!(region_of(""), None);
    }

    #[test]
    fn area_is_most_common_region() {
        let places = vec![
            Place::named("경복궁", "서울특별시 종로구"),
            Place::named("해운대", "부산광역시 해운대구"),
            Place::named("광안리", "부산광역시 수영구"),
        ];
        assert_eq!(derive_area(&places), "부산");
    }

    #[test]
    fn area_ties_go_to_first_region() {
        let places = vec![
            Place::named("성산일출봉", "제주특별자치도 서귀포시"),
            Place::named("경복궁", "서울특별시 종로구"),
        ];
        assert_eq!(derive_area(&places), "제주");
        assert_eq!(derive_area(&[]), "");
    }

    #[test]
    fn ordered_place_serializes_flat() {
        let ordered = assign_order(&[Place::named("남산", "서울 중구")]);
        let json = serde_json::to_value(&ordered[0]).unwrap();
        assert_eq!(json["name"], "남산");
        assert_eq!(json["order"], 0);
    }
}
