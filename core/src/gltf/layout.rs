//! Element layouts: how many components and attribute slots one accessor
//! element occupies, and its byte footprint.

use super::types::{Accessor, ComponentType, ElementType};

/// Layout of one element when bound to vertex attributes.
///
/// Matrices are tracked column by column so that each column can map to
/// its own consecutive attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttributeLayout {
    /// Components in each occupied attribute (1 to 4).
    pub components_per_attribute: usize,
    /// Attribute slots occupied by one element (1 for scalars and vectors).
    pub occupied_attributes: usize,
}

impl VertexAttributeLayout {
    pub const fn total_components(&self) -> usize {
        self.components_per_attribute * self.occupied_attributes
    }

    /// Bytes of one tightly packed element.
    pub const fn byte_size(&self, component_type: ComponentType) -> usize {
        self.total_components() * component_type.byte_size()
    }
}

impl ElementType {
    pub const fn layout(self) -> VertexAttributeLayout {
        let (components_per_attribute, occupied_attributes) = match self {
            Self::Scalar => (1, 1),
            Self::Vec2 => (2, 1),
            Self::Vec3 => (3, 1),
            Self::Vec4 => (4, 1),
            Self::Mat2 => (2, 2),
            Self::Mat3 => (3, 3),
            Self::Mat4 => (4, 4),
        };
        VertexAttributeLayout {
            components_per_attribute,
            occupied_attributes,
        }
    }
}

impl ComponentType {
    /// Size of one component in bytes.
    pub const fn byte_size(self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::UnsignedInt | Self::Float => 4,
        }
    }
}

impl Accessor {
    /// Bytes of one tightly packed element of this accessor.
    pub fn element_byte_size(&self) -> usize {
        self.element_type.layout().byte_size(self.component_type)
    }

    /// Bytes spanned by all elements when tightly packed, `None` when the
    /// count overflows.
    pub fn byte_size(&self) -> Option<usize> {
        self.element_byte_size().checked_mul(self.count)
    }

    /// Bytes spanned inside the buffer view given an optional stride.
    ///
    /// The last element contributes only its own size, not a full stride.
    pub fn strided_byte_size(&self, byte_stride: Option<usize>) -> Option<usize> {
        match (byte_stride, self.count) {
            (_, 0) => Some(0),
            (Some(stride), count) => stride
                .checked_mul(count - 1)?
                .checked_add(self.element_byte_size()),
            (None, _) => self.byte_size(),
        }
    }
}
