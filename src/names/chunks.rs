// src/names/chunks.rs
//! Таблица фрагментов имён (NAMECHNK)
//!
//! Файл состоит из записей: LE16 длина записи (включая заголовок), u8 число строк,
//! затем строки, завершённые нулём. Следующая запись начинается через «длину записи» байт
//! от начала текущей.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::province::parse::fixed_string;

const RECORD_HEADER_SIZE: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameChunkTable {
    lists: Vec<Vec<String>>,
}

impl NameChunkTable {
    #[must_use]
    pub const fn new(lists: Vec<Vec<String>>) -> Self {
        Self { lists }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut lists = Vec::new();
        let mut offset = 0;

        while offset < bytes.len() {
            let header = bytes
                .get(offset..offset + RECORD_HEADER_SIZE)
                .ok_or(Error::Truncated {
                    what: "name chunk header",
                    needed: RECORD_HEADER_SIZE,
                    available: bytes.len() - offset,
                })?;
            let record_len = usize::from(u16::from_le_bytes([header[0], header[1]]));
            let count = header[2];

            // запись короче заголовка не сдвинула бы курсор
            if record_len < RECORD_HEADER_SIZE {
                return Err(Error::Truncated {
                    what: "name chunk record",
                    needed: RECORD_HEADER_SIZE,
                    available: record_len,
                });
            }

            let mut string_offset = offset + RECORD_HEADER_SIZE;
            let mut strings = Vec::with_capacity(usize::from(count));
            for _ in 0..count {
                let rest = bytes.get(string_offset..).unwrap_or_default();
                let Some(len) = rest.iter().position(|&b| b == 0) else {
                    return Err(Error::Truncated {
                        what: "name chunk string",
                        needed: rest.len() + 1,
                        available: rest.len(),
                    });
                };
                strings.push(fixed_string(&rest[..len]));
                string_offset += len + 1;
            }

            lists.push(strings);
            offset += record_len;
        }

        debug!(lists = lists.len(), "name chunks loaded");
        Ok(Self { lists })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Обратная запись в формат NAMECHNK
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        for list in &self.lists {
            let body: usize = list.iter().map(|s| s.len() + 1).sum();
            let record_len = (RECORD_HEADER_SIZE + body) as u16;
            bytes.extend_from_slice(&record_len.to_le_bytes());
            bytes.push(list.len() as u8);
            for string in list {
                bytes.extend(string.chars().map(|c| c as u8));
                bytes.push(0);
            }
        }
        bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&[String]> {
        let list = self.lists.get(index).ok_or(Error::TableIndex {
            table: "name chunks",
            index,
            len: self.lists.len(),
        })?;
        if list.is_empty() {
            return Err(Error::EmptyNameChunk(index));
        }
        Ok(list)
    }
}
