use crate::octree::{NodeColor, Octree, OctreeError, OctreeSettings, PathCode};
use bendy::{
    decoding::{Error as BencodeDecodeError, FromBencode, Object},
    encoding::{Error as BencodeError, SingleItemEncoder, ToBencode},
};

/// Version of the snapshot layout, stored as the first element of the encoded tree
const SNAPSHOT_VERSION: u32 = 1;

///####################################################################################
/// NodeColor
///####################################################################################
impl ToBencode for NodeColor {
    const MAX_DEPTH: usize = 0;

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), BencodeError> {
        encoder.emit_int(u32::from(*self))
    }
}

impl FromBencode for NodeColor {
    fn decode_bencode_object(data: Object) -> Result<Self, BencodeDecodeError> {
        match data {
            Object::Integer(i) => i.parse::<u32>().map(NodeColor::from).map_err(|_| {
                BencodeDecodeError::unexpected_token(
                    "u32 NodeColor value",
                    format!("the number: {}", i),
                )
            }),
            _ => Err(BencodeDecodeError::unexpected_token(
                "int field NodeColor",
                "Something else",
            )),
        }
    }
}

///####################################################################################
/// PathCode
///####################################################################################
impl ToBencode for PathCode {
    const MAX_DEPTH: usize = 0;

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), BencodeError> {
        encoder.emit_bytes(self.as_bytes())
    }
}

impl FromBencode for PathCode {
    fn decode_bencode_object(data: Object) -> Result<Self, BencodeDecodeError> {
        match data {
            Object::Bytes(b) => PathCode::from_bytes(b.to_vec()).map_err(|err| {
                BencodeDecodeError::unexpected_token("A valid path code", err.to_string())
            }),
            _ => Err(BencodeDecodeError::unexpected_token(
                "bytes field PathCode",
                "Something else",
            )),
        }
    }
}

///####################################################################################
/// Octree
///####################################################################################

/// The stored state of a single node
struct NodeEntry {
    path_code: PathCode,
    color: NodeColor,
    density: f32,
}

impl ToBencode for NodeEntry {
    const MAX_DEPTH: usize = 1;

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), BencodeError> {
        encoder.emit_list(|e| {
            e.emit(&self.path_code)?;
            e.emit(self.color)?;
            e.emit_int(self.density.to_bits())
        })
    }
}

fn decode_u32(data: Option<Object>, field: &str) -> Result<u32, BencodeDecodeError> {
    match data {
        Some(Object::Integer(i)) => i.parse::<u32>().map_err(|_| {
            BencodeDecodeError::unexpected_token(format!("u32 field {}", field), i.to_string())
        }),
        _ => Err(BencodeDecodeError::unexpected_token(
            format!("int field {}", field),
            "Something else",
        )),
    }
}

fn missing_field(field: &str) -> BencodeDecodeError {
    BencodeDecodeError::unexpected_token(format!("field {}", field), "end of list")
}

impl FromBencode for NodeEntry {
    fn decode_bencode_object(data: Object) -> Result<Self, BencodeDecodeError> {
        match data {
            Object::List(mut list) => {
                let path_code = PathCode::decode_bencode_object(
                    list.next_object()?.ok_or_else(|| missing_field("path_code"))?,
                )?;
                let color = NodeColor::decode_bencode_object(
                    list.next_object()?.ok_or_else(|| missing_field("color"))?,
                )?;
                let density = f32::from_bits(decode_u32(list.next_object()?, "density")?);
                Ok(Self {
                    path_code,
                    color,
                    density,
                })
            }
            _ => Err(BencodeDecodeError::unexpected_token(
                "List of NodeEntry fields",
                "Something else",
            )),
        }
    }
}

impl ToBencode for Octree {
    const MAX_DEPTH: usize = NodeEntry::MAX_DEPTH + 2;

    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), BencodeError> {
        let entries: Vec<NodeEntry> = self
            .subtree_keys(self.root())
            .into_iter()
            .map(|node_key| {
                let node = self.node(node_key);
                NodeEntry {
                    path_code: node.path_code().clone(),
                    color: node.true_color(),
                    density: node.density(),
                }
            })
            .collect();
        encoder.emit_list(|e| {
            e.emit_int(SNAPSHOT_VERSION)?;
            e.emit(&entries)
        })
    }
}

impl FromBencode for Octree {
    fn decode_bencode_object(data: Object) -> Result<Self, BencodeDecodeError> {
        match data {
            Object::List(mut list) => {
                let version = decode_u32(list.next_object()?, "version")?;
                if SNAPSHOT_VERSION != version {
                    return Err(BencodeDecodeError::unexpected_token(
                        format!("snapshot version {}", SNAPSHOT_VERSION),
                        format!("snapshot version {}", version),
                    ));
                }
                let entries = Vec::<NodeEntry>::decode_bencode_object(
                    list.next_object()?.ok_or_else(|| missing_field("nodes"))?,
                )?;
                let mut tree = Octree::new();
                for entry in entries {
                    let node_key = tree.get_or_create_at_path(&entry.path_code);
                    tree.set_color(node_key, entry.color);
                    tree.set_density(node_key, entry.density);
                }
                Ok(tree)
            }
            _ => Err(BencodeDecodeError::unexpected_token(
                "List of Octree fields",
                "Something else",
            )),
        }
    }
}

impl Octree {
    /// converts the colors and densities of the tree to a byte representation.
    /// Detached subtrees are not included
    pub fn to_bytes(&self) -> Result<Vec<u8>, OctreeError> {
        self.to_bencode()
            .map_err(|err| OctreeError::InvalidStructure(format!("{:?}", err).into()))
    }

    /// parses the tree from a byte string, using the given settings
    pub fn from_bytes(bytes: &[u8], settings: OctreeSettings) -> Result<Self, OctreeError> {
        let mut tree = Self::from_bencode(bytes)
            .map_err(|err| OctreeError::InvalidStructure(format!("{:?}", err).into()))?;
        tree.settings = settings;
        Ok(tree)
    }

    /// saves the tree to the given file path
    pub fn save(&self, path: &str) -> Result<(), OctreeError> {
        use std::io::Write;
        let bytes = self.to_bytes()?;
        let mut file =
            std::fs::File::create(path).map_err(|err| OctreeError::InvalidStructure(err.into()))?;
        file.write_all(&bytes)
            .map_err(|err| OctreeError::InvalidStructure(err.into()))
    }

    /// loads the tree from the given file path
    pub fn load(path: &str, settings: OctreeSettings) -> Result<Self, OctreeError> {
        let bytes =
            std::fs::read(path).map_err(|err| OctreeError::InvalidStructure(err.into()))?;
        Self::from_bytes(&bytes, settings)
    }
}
