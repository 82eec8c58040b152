use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum IntegralType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
}

impl IntegralType {
    /// Width of the encoded integer in bits.
    pub const fn bit_width(&self) -> u64 {
        match self {
            IntegralType::U8 | IntegralType::I8 => 8,
            IntegralType::U16 | IntegralType::I16 => 16,
            IntegralType::U32 | IntegralType::I32 => 32,
            IntegralType::U64 | IntegralType::I64 => 64,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ContainerAttributes {
    /// Byte multiple the cursor is padded to after every flush. `None` defers
    /// to the file or command line setting, `Some(0)` forces natural packing.
    #[serde(default)]
    pub pack: Option<u64>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Default for ContainerAttributes {
    fn default() -> Self {
        Self {
            pack: None,
            comment: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ArrayType {
    pub element: IntegralType,
    pub count: u64,
}

/// Run whose length is read at runtime from an earlier integer field.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct DynamicRunType {
    pub size_from: String,
    #[serde(default = "DynamicRunType::default_scale")]
    pub scale: u64,
}

impl DynamicRunType {
    fn default_scale() -> u64 {
        1
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /* Bit-field of a fixed width */
    Bits(u64),
    /* Byte-aligned integer */
    Primitive(IntegralType),
    /* Byte-aligned fixed-count array of integers */
    Array(ArrayType),
    /* Byte-aligned run of `size_from * scale` bytes */
    Bytes(DynamicRunType),
    /* Bit-granular run of `size_from * scale` bits */
    BitRun(DynamicRunType),
}

impl FieldKind {
    /// True when the field must start on a byte boundary.
    pub fn is_byte_aligned(&self) -> bool {
        matches!(
            self,
            FieldKind::Primitive(_) | FieldKind::Array(_) | FieldKind::Bytes(_)
        )
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct StructField {
    pub name: String,
    #[serde(with = "serde_yml::with::singleton_map_recursive")]
    pub field_type: FieldKind,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct StructDef {
    pub name: String,
    #[serde(flatten)]
    pub container_attributes: ContainerAttributes,
    pub fields: Vec<StructField>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct FileOptions {
    #[serde(default)]
    pub pack: Option<u64>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Top-level contents of a layout definition file.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct LayoutFile {
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub options: FileOptions,
    pub structs: Vec<StructDef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_singleton_field_kinds() {
        let yaml = r#"
package: demo.net
options:
  pack: 2
structs:
  - name: Header
    pack: 4
    fields:
      - name: version
        field-type:
          bits: 3
      - name: len
        field-type:
          primitive: u16
      - name: words
        field-type:
          array:
            element: u32
            count: 2
      - name: payload
        field-type:
          bytes:
            size-from: len
      - name: tail
        field-type:
          bit-run:
            size-from: len
            scale: 3
"#;
        let file: LayoutFile = serde_yml::from_str(yaml).expect("parse layout file");
        assert_eq!(file.package.as_deref(), Some("demo.net"));
        assert_eq!(file.options.pack, Some(2));

        let header = &file.structs[0];
        assert_eq!(header.container_attributes.pack, Some(4));
        assert_eq!(header.fields[0].field_type, FieldKind::Bits(3));
        assert_eq!(
            header.fields[1].field_type,
            FieldKind::Primitive(IntegralType::U16)
        );
        assert_eq!(
            header.fields[2].field_type,
            FieldKind::Array(ArrayType {
                element: IntegralType::U32,
                count: 2
            })
        );
        assert_eq!(
            header.fields[3].field_type,
            FieldKind::Bytes(DynamicRunType {
                size_from: "len".into(),
                scale: 1
            })
        );
        assert_eq!(
            header.fields[4].field_type,
            FieldKind::BitRun(DynamicRunType {
                size_from: "len".into(),
                scale: 3
            })
        );
    }

    #[test]
    fn byte_alignment_by_kind() {
        assert!(!FieldKind::Bits(5).is_byte_aligned());
        assert!(FieldKind::Primitive(IntegralType::I8).is_byte_aligned());
        assert!(
            !FieldKind::BitRun(DynamicRunType {
                size_from: "n".into(),
                scale: 1
            })
            .is_byte_aligned()
        );
        assert_eq!(IntegralType::I64.bit_width(), 64);
    }
}
