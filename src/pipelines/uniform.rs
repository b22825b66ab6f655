//! Reflected uniform locations.
//!
//! Linking a program records where every named uniform lives: which buffer
//! (bind group and binding index), at which byte offset, and of what type.
//! Looking a name up is the equivalent of asking for a uniform location.

use std::collections::{BTreeMap, HashMap};

use wgpu::naga;

use crate::error::UniformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Matrix4,
    Other,
}

impl UniformKind {
    pub fn of(inner: &naga::TypeInner) -> Self {
        match inner {
            naga::TypeInner::Scalar(scalar) if *scalar == naga::Scalar::F32 => Self::Float,
            naga::TypeInner::Matrix {
                columns: naga::VectorSize::Quad,
                rows: naga::VectorSize::Quad,
                scalar,
            } if *scalar == naga::Scalar::F32 => Self::Matrix4,
            _ => Self::Other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Matrix4 => "mat4",
            Self::Other => "non-settable type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    pub group: u32,
    pub binding: u32,
    /// Byte offset inside the bound buffer.
    pub offset: u32,
    pub kind: UniformKind,
}

/// One uniform buffer the program expects to be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformBlock {
    pub group: u32,
    pub binding: u32,
    pub size: u32,
}

#[derive(Debug, Clone, Default)]
pub struct UniformTable {
    slots: HashMap<String, UniformSlot>,
    blocks: BTreeMap<(u32, u32), u32>,
}

impl UniformTable {
    pub fn get(&self, name: &str) -> Option<&UniformSlot> {
        self.slots.get(name)
    }

    pub fn locate(&self, name: &str) -> Result<UniformSlot, UniformError> {
        self.slots
            .get(name)
            .copied()
            .ok_or_else(|| UniformError::NotFound {
                name: name.to_string(),
            })
    }

    /// Like [`locate`](Self::locate) but also requires the slot to hold `kind`.
    pub fn locate_as(&self, name: &str, kind: UniformKind) -> Result<UniformSlot, UniformError> {
        let slot = self.locate(name)?;
        if slot.kind != kind {
            return Err(UniformError::TypeMismatch {
                name: name.to_string(),
                expected: kind.name(),
                found: slot.kind.name(),
            });
        }
        Ok(slot)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Blocks ordered by (group, binding).
    pub fn blocks(&self) -> impl Iterator<Item = UniformBlock> + '_ {
        self.blocks
            .iter()
            .map(|(&(group, binding), &size)| UniformBlock {
                group,
                binding,
                size,
            })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Both stages may declare the same block; they must agree on its size.
    pub(crate) fn insert_block(&mut self, block: UniformBlock) -> Result<(), String> {
        match self.blocks.get(&(block.group, block.binding)) {
            Some(&size) if size != block.size => Err(format!(
                "uniform block at group {} binding {} is {} bytes in one stage and {} in the other",
                block.group, block.binding, size, block.size
            )),
            Some(_) => Ok(()),
            None => {
                self.blocks.insert((block.group, block.binding), block.size);
                Ok(())
            }
        }
    }

    pub(crate) fn insert_slot(&mut self, name: &str, slot: UniformSlot) -> Result<(), String> {
        match self.slots.get(name) {
            Some(existing) if *existing != slot => Err(format!(
                "uniform `{}` is declared at group {} binding {} offset {} and at group {} binding {} offset {}",
                name,
                existing.group,
                existing.binding,
                existing.offset,
                slot.group,
                slot.binding,
                slot.offset
            )),
            Some(_) => Ok(()),
            None => {
                self.slots.insert(name.to_string(), slot);
                Ok(())
            }
        }
    }
}
