//! Spatial consistency checks on detection bounding boxes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use kinefit_models::DetectionCandidate;

/// Configuration for the spatial consistency filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialFilterConfig {
    /// Minimum bbox height in pixels (default: 80.0)
    pub min_bbox_height: f64,
    /// Maximum bbox height as a fraction of frame height (default: 0.95)
    pub max_height_ratio: f64,
    /// Lower edge of the standing-person width/height band (default: 0.2)
    pub min_aspect_ratio: f64,
    /// Upper edge of the standing-person width/height band (default: 0.8)
    pub max_aspect_ratio: f64,
    /// Margin in pixels inside which a detection counts as near the frame
    /// edge; such detections are logged, never rejected (default: 10.0)
    pub edge_margin: f64,
}

impl Default for SpatialFilterConfig {
    fn default() -> Self {
        Self {
            min_bbox_height: 80.0,
            max_height_ratio: 0.95,
            min_aspect_ratio: 0.2,
            max_aspect_ratio: 0.8,
            edge_margin: 10.0,
        }
    }
}

/// Rejects bounding boxes that cannot plausibly contain a standing person.
#[derive(Debug, Clone)]
pub struct SpatialConsistencyFilter {
    config: SpatialFilterConfig,
}

impl SpatialConsistencyFilter {
    /// Create a filter with the given config.
    pub fn new(config: SpatialFilterConfig) -> Self {
        Self { config }
    }

    /// Whether the candidate passes the spatial checks for a frame of the
    /// given dimensions.
    pub fn accept(
        &self,
        candidate: &DetectionCandidate,
        frame_width: u32,
        frame_height: u32,
    ) -> bool {
        let bbox = &candidate.bbox;

        if bbox.height < self.config.min_bbox_height {
            debug!(height = bbox.height, "bbox below minimum height");
            return false;
        }

        let max_height = frame_height as f64 * self.config.max_height_ratio;
        if bbox.height > max_height {
            debug!(height = bbox.height, max_height, "bbox above frame-relative maximum");
            return false;
        }

        let aspect = bbox.aspect_ratio();
        if aspect < self.config.min_aspect_ratio || aspect > self.config.max_aspect_ratio {
            debug!(aspect, "bbox outside standing-person aspect band");
            return false;
        }

        // Near-edge detections are informational only
        let margin = self.config.edge_margin;
        if bbox.x < margin
            || bbox.y < margin
            || bbox.x2() > frame_width as f64 - margin
            || bbox.y2() > frame_height as f64 - margin
        {
            debug!(
                x = bbox.x,
                y = bbox.y,
                "detection near frame edge, keeping"
            );
        }

        true
    }
}
