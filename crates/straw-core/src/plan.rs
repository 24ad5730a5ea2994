//! Build plan: which parts a configuration is assembled from
//!
//! A pure decision table over straw type, end type and wrapper type. The
//! assembler turns the plan into transforms.

use crate::config::{Configuration, EndType, StrawType, WrapperType};
use crate::constants::{EXTRA_FLEX_ANGLE, FLEX_ANGLE};
use crate::part::PartKind;

/// Body layout of the straw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    /// Bottom, straight filler, top
    Straight,
    /// Bottom, knee, flex section, top
    Flexible,
    /// Bottom, knee, long flex section (carries its own top)
    ExtraFlexible,
    /// Bottom with the angled top sitting directly on it
    Beveled,
    /// Single scoop shell
    Scoop,
}

impl BodyShape {
    /// Parts in assembly order
    pub fn parts(&self) -> &'static [PartKind] {
        match self {
            BodyShape::Straight => &[
                PartKind::StrawBottom,
                PartKind::StraightFiller,
                PartKind::StrawTop,
            ],
            BodyShape::Flexible => &[
                PartKind::StrawBottom,
                PartKind::FlexKnee,
                PartKind::StrawFlex,
                PartKind::StrawTop,
            ],
            BodyShape::ExtraFlexible => &[
                PartKind::StrawBottom,
                PartKind::FlexKnee,
                PartKind::StrawLongFlex,
            ],
            BodyShape::Beveled => &[PartKind::StrawBottom, PartKind::StrawTopBevel],
            BodyShape::Scoop => &[PartKind::ScoopShell],
        }
    }
}

/// Wrapper shell around the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapperPlan {
    pub part: PartKind,
    /// Opaque wrappers hide the body entirely
    pub hides_body: bool,
}

/// Everything the assembler needs to know about a configuration's shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildPlan {
    pub body: BodyShape,
    /// Rotation of the joint group about X (radians), 0 when unbent
    pub joint_angle: f32,
    pub wrapper: Option<WrapperPlan>,
}

impl BuildPlan {
    /// Decide the plan for a configuration.
    ///
    /// The combination is normalized first, so an invalid pairing such as a
    /// flexible straw with a scoop end plans as a straight scoop straw.
    pub fn for_config(config: &Configuration) -> BuildPlan {
        let config = config.clone().normalized();
        Self::for_combination(config.straw_type, config.end_type, config.wrapper_type)
    }

    /// Decide the plan for a raw enum combination
    pub fn for_combination(
        straw_type: StrawType,
        end_type: EndType,
        wrapper_type: WrapperType,
    ) -> BuildPlan {
        let straw_type = if end_type.forces_straight() {
            StrawType::Straight
        } else {
            straw_type
        };

        let body = match (end_type, straw_type) {
            (EndType::Scoop, _) => BodyShape::Scoop,
            (EndType::FortyFiveDegree, _) => BodyShape::Beveled,
            (EndType::Standard, StrawType::Straight) => BodyShape::Straight,
            (EndType::Standard, StrawType::Flexible) => BodyShape::Flexible,
            (EndType::Standard, StrawType::ExtraFlexible) => BodyShape::ExtraFlexible,
        };

        let wrapper = match wrapper_type {
            WrapperType::Unwrapped => None,
            WrapperType::PaperWrapped => Some(WrapperPlan {
                part: PartKind::WrapPaper,
                hides_body: true,
            }),
            WrapperType::FilmWrapped => Some(WrapperPlan {
                part: PartKind::WrapFilm,
                hides_body: false,
            }),
        };

        // Packaged straws are shown unbent
        let joint_angle = match (body, wrapper) {
            (_, Some(_)) => 0.0,
            (BodyShape::Flexible, None) => FLEX_ANGLE,
            (BodyShape::ExtraFlexible, None) => EXTRA_FLEX_ANGLE,
            _ => 0.0,
        };

        BuildPlan {
            body,
            joint_angle,
            wrapper,
        }
    }

    /// Whether body nodes are emitted
    pub fn body_visible(&self) -> bool {
        !self.wrapper.is_some_and(|w| w.hides_body)
    }

    /// Every part the plan references, body first then wrapper
    pub fn parts(&self) -> Vec<PartKind> {
        let mut parts = self.body.parts().to_vec();
        if let Some(wrapper) = self.wrapper {
            parts.push(wrapper.part);
        }
        parts
    }

    /// Library parts that must be loaded before the plan can be assembled.
    ///
    /// A straight body also needs the flex part: the filler takes its height.
    pub fn required_library_parts(&self) -> Vec<PartKind> {
        let mut parts: Vec<PartKind> = self
            .parts()
            .into_iter()
            .filter(|kind| kind.is_library_part())
            .collect();
        if self.body == BodyShape::Straight {
            parts.push(PartKind::StrawFlex);
        }
        parts
    }
}
