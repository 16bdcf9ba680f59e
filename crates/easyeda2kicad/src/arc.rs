//! SVG elliptical arcs: endpoint parameterization to center parameterization.
//!
//! The math follows the implementation notes of the SVG specification
//! (appendix F.6.5), as also done by Apache Batik's
//! `ExtendedGeneralPath::computeArc`.

use thiserror::Error;

use crate::transform::{Frame, Point};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArcError {
    #[error("invalid arc path: {0}")]
    InvalidPath(String),

    #[error("arc resolution produced a non-finite result")]
    NonFinite,
}

/// Arc as written in a path: `M x0 y0 A rx ry rotation large-arc sweep x y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointArc {
    pub start: Point,
    pub rx: f64,
    pub ry: f64,
    /// Degrees.
    pub x_axis_rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
    pub end: Point,
}

/// Arc described by its center, radii, start angle and signed extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterArc {
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    /// Degrees, measured from the x axis of the ellipse.
    pub start_angle: f64,
    /// Degrees; in [0, 360) for sweep arcs, (-360, 0] otherwise.
    pub extent: f64,
}

impl EndpointArc {
    /// Parse the `M ... A ...` path of an ARC shape. Commas and whitespace
    /// are interchangeable separators.
    pub fn parse(path: &str) -> Result<Self, ArcError> {
        let invalid = || ArcError::InvalidPath(path.to_string());
        let normalized = path.replace(',', " ");
        let rest = normalized.trim().strip_prefix('M').ok_or_else(invalid)?;
        let (move_to, arc_to) = rest.split_once('A').ok_or_else(invalid)?;
        let numbers = |s: &str| {
            s.split_whitespace()
                .map(str::parse::<f64>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| invalid())
        };
        let start = numbers(move_to)?;
        let params = numbers(arc_to)?;
        match (start.as_slice(), params.as_slice()) {
            ([x0, y0], [rx, ry, rotation, large_arc, sweep, x, y]) => Ok(Self {
                start: Point::new(*x0, *y0),
                rx: *rx,
                ry: *ry,
                x_axis_rotation: *rotation,
                large_arc: *large_arc == 1.0,
                sweep: *sweep == 1.0,
                end: Point::new(*x, *y),
            }),
            _ => Err(invalid()),
        }
    }

    /// The same arc expressed in a child frame.
    ///
    /// Endpoints are mapped through `to_local`; radii are lengths and stay
    /// as they are while the ellipse axis turns with the frame.
    pub fn in_frame(&self, frame: &Frame, to_local: impl Fn(Point) -> Point) -> Self {
        Self {
            start: to_local(self.start),
            end: to_local(self.end),
            x_axis_rotation: self.x_axis_rotation + frame.angle,
            ..*self
        }
    }

    /// The same arc in a frame whose y axis points the other way, such as a
    /// symbol's. Mirroring reverses the sweep direction.
    pub fn mirrored(&self, to_local: impl Fn(Point) -> Point) -> Self {
        Self {
            start: to_local(self.start),
            end: to_local(self.end),
            x_axis_rotation: -self.x_axis_rotation,
            sweep: !self.sweep,
            ..*self
        }
    }

    /// Solve for the center form. Radii too small to span the chord are
    /// scaled up uniformly; degenerate input (zero radius, coincident
    /// endpoints) yields [`ArcError::NonFinite`].
    pub fn resolve(&self) -> Result<CenterArc, ArcError> {
        let (x0, y0) = (self.start.x, self.start.y);
        let (x, y) = (self.end.x, self.end.y);

        // Half distance between the current and the final point
        let dx2 = (x0 - x) / 2.0;
        let dy2 = (y0 - y) / 2.0;
        let angle = (self.x_axis_rotation % 360.0).to_radians();
        let (sin_angle, cos_angle) = angle.sin_cos();

        // Step 1: (x1, y1), the half chord in the ellipse's own axes
        let x1 = cos_angle * dx2 + sin_angle * dy2;
        let y1 = -sin_angle * dx2 + cos_angle * dy2;

        let mut rx = self.rx.abs();
        let mut ry = self.ry.abs();
        let mut prx = rx * rx;
        let mut pry = ry * ry;
        let px1 = x1 * x1;
        let py1 = y1 * y1;
        let radii_check = px1 / prx + py1 / pry;
        if radii_check > 1.0 {
            rx *= radii_check.sqrt();
            ry *= radii_check.sqrt();
            prx = rx * rx;
            pry = ry * ry;
        }

        // Step 2: (cx1, cy1)
        let sign = if self.large_arc == self.sweep { -1.0 } else { 1.0 };
        let mut sq = (prx * pry - prx * py1 - pry * px1) / (prx * py1 + pry * px1);
        if sq < 0.0 {
            sq = 0.0;
        }
        let coef = sign * sq.sqrt();
        let cx1 = coef * ((rx * y1) / ry);
        let cy1 = coef * -((ry * x1) / rx);

        // Step 3: (cx, cy) from (cx1, cy1)
        let sx2 = (x0 + x) / 2.0;
        let sy2 = (y0 + y) / 2.0;
        let cx = sx2 + (cos_angle * cx1 - sin_angle * cy1);
        let cy = sy2 + (sin_angle * cx1 + cos_angle * cy1);

        // Step 4: start angle and extent
        let ux = (x1 - cx1) / rx;
        let uy = (y1 - cy1) / ry;
        let vx = (-x1 - cx1) / rx;
        let vy = (-y1 - cy1) / ry;

        let n = (ux * ux + uy * uy).sqrt();
        let sign = if uy < 0.0 { -1.0 } else { 1.0 };
        let start_angle = (sign * (ux / n).clamp(-1.0, 1.0).acos()).to_degrees();

        let n = ((ux * ux + uy * uy) * (vx * vx + vy * vy)).sqrt();
        let p = ux * vx + uy * vy;
        let sign = if ux * vy - uy * vx < 0.0 { -1.0 } else { 1.0 };
        let mut extent = (sign * (p / n).clamp(-1.0, 1.0).acos()).to_degrees();
        if !self.sweep && extent > 0.0 {
            extent -= 360.0;
        } else if self.sweep && extent < 0.0 {
            extent += 360.0;
        }

        let arc = CenterArc {
            center: Point::new(cx, cy),
            rx,
            ry,
            start_angle: start_angle % 360.0,
            extent: extent % 360.0,
        };
        if [arc.center.x, arc.center.y, arc.start_angle, arc.extent]
            .iter()
            .all(|v| v.is_finite())
        {
            Ok(arc)
        } else {
            Err(ArcError::NonFinite)
        }
    }
}
