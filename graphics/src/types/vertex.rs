//! Vertex attribute and index formats.

use crate::backend::GpuBuffer;

/// Numeric type of one vertex attribute component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexComponent {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl VertexComponent {
    /// Size of one component in bytes.
    pub const fn byte_size(self) -> u32 {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }

    /// Whether the shader reads the attribute as integers.
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::F32)
    }
}

/// Format of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    U8,
    U16,
    U32,
}

impl IndexFormat {
    pub const fn byte_size(self) -> u32 {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// One vertex attribute sourced from a buffer.
///
/// Mirrors a `glVertexAttribPointer` call: `components` values of type
/// `component` are read from `buffer` at `offset + n * stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Shader attribute location.
    pub location: u32,
    pub buffer: GpuBuffer,
    /// 1 to 4.
    pub components: u32,
    pub component: VertexComponent,
    /// Integer components are mapped to `[0, 1]` or `[-1, 1]`.
    pub normalized: bool,
    /// Bytes between consecutive elements, 0 for tightly packed.
    pub stride: u32,
    /// Byte offset of the first element.
    pub offset: u64,
    /// 0 advances per vertex, n advances every n instances.
    pub divisor: u32,
}

impl VertexAttribute {
    /// Bytes of one element of this attribute.
    pub const fn element_size(&self) -> u32 {
        self.components * self.component.byte_size()
    }

    /// Stride actually used, resolving the tightly packed case.
    pub const fn effective_stride(&self) -> u32 {
        if self.stride == 0 {
            self.element_size()
        } else {
            self.stride
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(VertexComponent::I8, 1, true)]
    #[case(VertexComponent::U16, 2, true)]
    #[case(VertexComponent::U32, 4, true)]
    #[case(VertexComponent::F32, 4, false)]
    fn test_component_size(#[case] component: VertexComponent, #[case] size: u32, #[case] integer: bool) {
        assert_eq!(component.byte_size(), size);
        assert_eq!(component.is_integer(), integer);
    }

    #[test]
    fn test_effective_stride() {
        let mut attribute = VertexAttribute {
            location: 0,
            buffer: GpuBuffer::from_raw(1),
            components: 3,
            component: VertexComponent::F32,
            normalized: false,
            stride: 0,
            offset: 0,
            divisor: 0,
        };
        assert_eq!(attribute.effective_stride(), 12);
        attribute.stride = 32;
        assert_eq!(attribute.effective_stride(), 32);
        assert_eq!(IndexFormat::U16.byte_size(), 2);
    }
}
