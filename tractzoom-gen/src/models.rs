//! Tract record shared by every pipeline stage

use geo::Geometry;

/// Number of leading identifier characters naming the state
pub const STATE_CODE_LEN: usize = 2;

/// One census tract joined with its score and boundary
#[derive(Debug, Clone, PartialEq)]
pub struct Tract {
    /// Fixed-width tract identifier (state + county + tract code)
    pub geoid: String,
    /// Tract score, finite
    pub score: f64,
    /// Polygon or MultiPolygon boundary, never empty
    pub geometry: Geometry<f64>,
}

impl Tract {
    /// State code prefix of the identifier
    ///
    /// The loader only admits identifiers with an ASCII state prefix, so the
    /// slice always succeeds for loaded tracts.
    pub fn state_code(&self) -> &str {
        self.geoid.get(..STATE_CODE_LEN).unwrap_or(&self.geoid)
    }
}

/// True when a geometry has no polygon with a usable exterior ring
pub fn is_empty_geometry(geometry: &Geometry<f64>) -> bool {
    match geometry {
        Geometry::Polygon(polygon) => polygon.exterior().0.is_empty(),
        Geometry::MultiPolygon(multi) => multi.0.iter().all(|p| p.exterior().0.is_empty()),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, LineString, MultiPolygon, Polygon};

    #[test]
    fn test_state_code_is_prefix() {
        let tract = Tract {
            geoid: "56001963700".to_string(),
            score: 0.4,
            geometry: Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)]),
        };
        assert_eq!(tract.state_code(), "56");
    }

    #[test]
    fn test_empty_geometries() {
        let empty_polygon = Polygon::new(LineString::new(Vec::new()), Vec::new());
        assert!(is_empty_geometry(&Geometry::Polygon(empty_polygon.clone())));
        assert!(is_empty_geometry(&Geometry::MultiPolygon(MultiPolygon::new(Vec::new()))));
        assert!(is_empty_geometry(&Geometry::MultiPolygon(MultiPolygon::new(vec![empty_polygon]))));

        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        assert!(!is_empty_geometry(&Geometry::Polygon(square)));
    }
}
