use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, info, trace};

use crate::{
    storage::header::DatabaseHeader,
    types::{
        METADATA_PAGE_NUM, PAGE_SIZE, PageNum,
        error::DatabaseError,
        page::{INTERNAL_NODE_MAX_KEYS, MIN_INTERNAL_MAX_KEYS, Page},
    },
};

/// Maps page numbers to page buffers backed by the database file.
///
/// Pages live in an arena indexed by page number and are loaded from disk on
/// first access. Page 0 holds the [`DatabaseHeader`] and is never handed out
/// as a node; it is rewritten from the in-memory header on every flush.
pub struct Pager {
    path: PathBuf,
    file: File,
    header: DatabaseHeader,
    header_dirty: bool,
    /// Pages that exist on disk. Anything at or beyond this is never read.
    file_pages: u32,
    num_pages: u32,
    max_pages: u32,
    pages: Vec<Option<Page>>,
}

impl Pager {
    /// Opens (or creates) the database file at `path`.
    ///
    /// A brand-new file gets a fresh header built with `internal_max_keys`; for
    /// an existing file the stored header wins.
    pub fn open<P: AsRef<Path>>(
        path: P,
        max_pages: u32,
        internal_max_keys: u32,
    ) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let file_length = file.metadata()?.len();
        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(DatabaseError::CorruptedDatabase {
                reason: format!(
                    "File length {} is not a whole number of {}-byte pages",
                    file_length, PAGE_SIZE
                ),
            });
        }
        let pages_on_disk = (file_length / PAGE_SIZE as u64) as u32;

        let (header, header_dirty) = if pages_on_disk == 0 {
            let fan_out_range = MIN_INTERNAL_MAX_KEYS..=INTERNAL_NODE_MAX_KEYS as u32;
            if !fan_out_range.contains(&internal_max_keys) {
                return Err(DatabaseError::InvalidConfig {
                    details: format!(
                        "internal node fan-out must be between {} and {}, got {}",
                        MIN_INTERNAL_MAX_KEYS, INTERNAL_NODE_MAX_KEYS, internal_max_keys
                    ),
                });
            }
            info!(path = %path.display(), "creating new database");
            (DatabaseHeader::new(internal_max_keys), true)
        } else {
            info!(path = %path.display(), pages = pages_on_disk, "opening existing database");
            let mut buffer = vec![0u8; PAGE_SIZE];
            file.seek(SeekFrom::Start(0))?;
            file.read_exact(&mut buffer)?;
            let header = DatabaseHeader::from_bytes(&buffer)?;
            if header.page_count > pages_on_disk {
                return Err(DatabaseError::CorruptedDatabase {
                    reason: format!(
                        "Header claims {} pages but the file holds {}",
                        header.page_count, pages_on_disk
                    ),
                });
            }
            (header, false)
        };

        let num_pages = header.page_count.max(1);
        if num_pages > max_pages {
            return Err(DatabaseError::TableFull { max_pages });
        }

        let mut pages = Vec::with_capacity(max_pages as usize);
        pages.resize_with(max_pages as usize, || None);

        Ok(Self {
            path: path.to_path_buf(),
            file,
            header,
            header_dirty,
            file_pages: num_pages.min(pages_on_disk),
            num_pages,
            max_pages,
            pages,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &DatabaseHeader {
        &self.header
    }

    /// Total number of pages, including the header page.
    pub fn page_count(&self) -> u32 {
        self.num_pages
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    fn ensure_loaded(&mut self, page_num: PageNum) -> Result<(), DatabaseError> {
        if page_num == METADATA_PAGE_NUM {
            return Err(DatabaseError::CorruptedPage {
                page_num,
                reason: "Page 0 is reserved for the database header".to_string(),
            });
        }
        if page_num >= self.max_pages {
            return Err(DatabaseError::TableFull {
                max_pages: self.max_pages,
            });
        }

        let index = page_num as usize;
        if self.pages[index].is_none() {
            let page = if page_num < self.file_pages {
                trace!(page_num, "loading page from disk");
                let mut buffer = vec![0u8; PAGE_SIZE];
                self.file.seek(SeekFrom::Start(page_offset(page_num)))?;
                self.file.read_exact(&mut buffer)?;
                let page = Page::from_bytes(&buffer)?;
                page.check_cell_count(page_num)?;
                page
            } else {
                // Never written yet; dirty so the flush leaves no hole in the file.
                let mut page = Page::new();
                page.is_dirty = true;
                page
            };
            self.pages[index] = Some(page);
            if page_num >= self.num_pages {
                self.num_pages = page_num + 1;
                self.header_dirty = true;
            }
        }
        Ok(())
    }

    /// Read access to a page, loading it on first use.
    pub fn page(&mut self, page_num: PageNum) -> Result<&Page, DatabaseError> {
        self.ensure_loaded(page_num)?;
        self.pages[page_num as usize]
            .as_ref()
            .ok_or_else(|| DatabaseError::CorruptedPage {
                page_num,
                reason: "Page missing from cache".to_string(),
            })
    }

    /// Write access to a page. The page is flushed on the next [`Pager::flush_all`].
    pub fn page_mut(&mut self, page_num: PageNum) -> Result<&mut Page, DatabaseError> {
        self.ensure_loaded(page_num)?;
        let page = self.pages[page_num as usize]
            .as_mut()
            .ok_or_else(|| DatabaseError::CorruptedPage {
                page_num,
                reason: "Page missing from cache".to_string(),
            })?;
        page.is_dirty = true;
        Ok(page)
    }

    /// Hands out the next unused page number. Pages are never recycled.
    pub fn allocate_page(&mut self) -> Result<PageNum, DatabaseError> {
        let page_num = self.num_pages;
        if page_num >= self.max_pages {
            return Err(DatabaseError::TableFull {
                max_pages: self.max_pages,
            });
        }
        self.ensure_loaded(page_num)?;
        debug!(page_num, "allocated page");
        Ok(page_num)
    }

    /// Number of pages that can still be allocated.
    pub fn free_page_slots(&self) -> u32 {
        self.max_pages.saturating_sub(self.num_pages)
    }

    /// Writes the header and every dirty page back to the file, then syncs it.
    pub fn flush_all(&mut self) -> Result<(), DatabaseError> {
        let mut flushed = 0;

        if self.header_dirty || self.header.page_count != self.num_pages {
            self.header.page_count = self.num_pages;
            let header_bytes = self.header.to_bytes()?;
            write_page_at(&mut self.file, METADATA_PAGE_NUM, &header_bytes)?;
            self.header_dirty = false;
            flushed += 1;
        }

        let cached = self.pages.iter_mut().enumerate().take(self.num_pages as usize);
        for (page_num, slot) in cached.skip(1) {
            if let Some(page) = slot.as_mut().filter(|page| page.is_dirty) {
                write_page_at(&mut self.file, page_num as PageNum, page.to_bytes())?;
                page.is_dirty = false;
                flushed += 1;
            }
        }

        self.file.flush()?;
        self.file.sync_all()?;
        self.file_pages = self.num_pages;
        debug!(pages = flushed, "flushed pages");
        Ok(())
    }
}

fn page_offset(page_num: PageNum) -> u64 {
    page_num as u64 * PAGE_SIZE as u64
}

fn write_page_at(file: &mut File, page_num: PageNum, bytes: &[u8]) -> Result<(), DatabaseError> {
    file.seek(SeekFrom::Start(page_offset(page_num)))?;
    file.write_all(bytes)?;
    Ok(())
}
