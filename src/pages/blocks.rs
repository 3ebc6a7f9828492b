// Content block model - staged edits on a page draft's ordered block list
// Nothing here touches the store; blocks persist with the enclosing page save

use once_cell::sync::Lazy;

use crate::infrastructure::BlockIdGenerator;
use crate::models::{Block, BlockField, BlockType, Page};

static BLOCK_IDS: Lazy<BlockIdGenerator> = Lazy::new(BlockIdGenerator::new);

impl Block {
    /// A block of `block_type` with a fresh id and an empty payload.
    pub fn new(block_type: BlockType) -> Self {
        Self {
            id: BLOCK_IDS.next_id(),
            block_type,
            content: String::new(),
            url: String::new(),
        }
    }

    pub fn set_field(&mut self, field: BlockField, value: String) {
        match field {
            BlockField::Content => self.content = value,
            BlockField::Url => self.url = value,
        }
    }

    /// The payload that matters for this block's type.
    pub fn payload(&self) -> &str {
        match self.block_type.payload_field() {
            BlockField::Content => &self.content,
            BlockField::Url => &self.url,
        }
    }
}

impl Page {
    /// Append an empty block of `block_type`; returns its id.
    pub fn add_block(&mut self, block_type: BlockType) -> String {
        let block = Block::new(block_type);
        let id = block.id.clone();
        self.blocks.push(block);
        id
    }

    /// Set one field on the block with `id`. Order and ids are untouched;
    /// an unknown id leaves the list as it was. Returns whether a block matched.
    pub fn update_block(&mut self, id: &str, field: BlockField, value: impl Into<String>) -> bool {
        let value = value.into();
        let mut matched = false;
        for block in self.blocks.iter_mut().filter(|block| block.id == id) {
            block.set_field(field, value.clone());
            matched = true;
        }
        matched
    }

    /// Remove the block with `id`. Returns whether anything was removed.
    pub fn delete_block(&mut self, id: &str) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|block| block.id != id);
        self.blocks.len() != before
    }
}
