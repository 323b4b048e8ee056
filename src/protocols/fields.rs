use crate::error::{ScaleError, ScaleResult};

/// Byte order used when packing multi-byte payload fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Native order of the AVR and ARM boards the firmware runs on
    #[default]
    Little,
    Big,
}

/// One binary payload value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    Char(u8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    F32(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Char,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
}

macro_rules! to_bytes {
    ($value:expr, $order:expr) => {
        match $order {
            ByteOrder::Little => $value.to_le_bytes().to_vec(),
            ByteOrder::Big => $value.to_be_bytes().to_vec(),
        }
    };
}

macro_rules! from_bytes {
    ($ty:ty, $bytes:expr, $order:expr) => {{
        let mut raw = [0u8; std::mem::size_of::<$ty>()];
        raw.copy_from_slice($bytes);
        match $order {
            ByteOrder::Little => <$ty>::from_le_bytes(raw),
            ByteOrder::Big => <$ty>::from_be_bytes(raw),
        }
    }};
}

impl Field {
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Char(_) => FieldKind::Char,
            Field::U8(_) => FieldKind::U8,
            Field::I16(_) => FieldKind::I16,
            Field::U16(_) => FieldKind::U16,
            Field::I32(_) => FieldKind::I32,
            Field::U32(_) => FieldKind::U32,
            Field::F32(_) => FieldKind::F32,
        }
    }

    pub fn pack(&self, order: ByteOrder) -> Vec<u8> {
        match *self {
            Field::Char(c) | Field::U8(c) => vec![c],
            Field::I16(v) => to_bytes!(v, order),
            Field::U16(v) => to_bytes!(v, order),
            Field::I32(v) => to_bytes!(v, order),
            Field::U32(v) => to_bytes!(v, order),
            Field::F32(v) => to_bytes!(v, order),
        }
    }
}

impl FieldKind {
    pub fn size(self) -> usize {
        match self {
            FieldKind::Char | FieldKind::U8 => 1,
            FieldKind::I16 | FieldKind::U16 => 2,
            FieldKind::I32 | FieldKind::U32 | FieldKind::F32 => 4,
        }
    }

    /// `bytes` must be exactly `self.size()` long
    fn decode(self, bytes: &[u8], order: ByteOrder) -> Field {
        match self {
            FieldKind::Char => Field::Char(bytes[0]),
            FieldKind::U8 => Field::U8(bytes[0]),
            FieldKind::I16 => Field::I16(from_bytes!(i16, bytes, order)),
            FieldKind::U16 => Field::U16(from_bytes!(u16, bytes, order)),
            FieldKind::I32 => Field::I32(from_bytes!(i32, bytes, order)),
            FieldKind::U32 => Field::U32(from_bytes!(u32, bytes, order)),
            FieldKind::F32 => Field::F32(from_bytes!(f32, bytes, order)),
        }
    }
}

/// Total number of bytes a layout occupies on the wire
pub fn layout_size(layout: &[FieldKind]) -> usize {
    layout.iter().map(|kind| kind.size()).sum()
}

/// Unpack raw bytes into fields following `layout`
pub fn unpack(bytes: &[u8], layout: &[FieldKind], order: ByteOrder) -> ScaleResult<Vec<Field>> {
    let expected = layout_size(layout);
    if bytes.len() != expected {
        return Err(ScaleError::Encoding(format!(
            "Layout {:?} needs {} bytes, got {}",
            layout,
            expected,
            bytes.len()
        )));
    }

    let mut fields = Vec::with_capacity(layout.len());
    let mut offset = 0;
    for kind in layout {
        let end = offset + kind.size();
        fields.push(kind.decode(&bytes[offset..end], order));
        offset = end;
    }

    Ok(fields)
}
