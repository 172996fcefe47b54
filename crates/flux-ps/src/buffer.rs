// 定长字节缓冲区
// 容量在分配时确定，不做自动扩容

use crate::{DemuxError, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// 定长追加缓冲区
///
/// `data` 的长度始终等于容量，`length` 为写入位置。
/// 默认构造的缓冲区处于未分配状态（容量为 0）。
#[derive(Debug, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
    length: usize,
}

impl ByteBuffer {
    /// 分配指定容量的缓冲区
    pub fn allocate(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(DemuxError::AllocationFailed { requested: 0 });
        }

        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| DemuxError::AllocationFailed { requested: capacity })?;
        data.resize(capacity, 0);

        Ok(Self { data, length: 0 })
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn is_allocated(&self) -> bool {
        !self.data.is_empty()
    }

    /// 剩余可写字节数
    pub fn remaining(&self) -> usize {
        self.capacity() - self.length
    }

    /// 已写入的数据
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.length]
    }

    /// 清空内容并复位写入位置（未分配时为空操作）
    pub fn clear(&mut self) {
        if !self.is_allocated() {
            return;
        }
        // 写入位置之后的区域始终为 0
        self.data[..self.length].fill(0);
        self.length = 0;
    }

    /// 追加数据，空间不足时拒绝写入，原内容保持不变
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.is_allocated() {
            return Err(DemuxError::InvalidHandle);
        }
        if bytes.len() > self.remaining() {
            return Err(DemuxError::CapacityExceeded {
                requested: bytes.len(),
                available: self.remaining(),
            });
        }

        self.data[self.length..self.length + bytes.len()].copy_from_slice(bytes);
        self.length += bytes.len();
        Ok(())
    }

    /// 从 reader 读取最多 `max` 字节追加到尾部，返回实际读取的字节数
    pub fn fill_from<R: Read>(&mut self, reader: &mut R, max: usize) -> Result<usize> {
        if !self.is_allocated() {
            return Err(DemuxError::InvalidHandle);
        }

        let n = max.min(self.remaining());
        let read = reader.read(&mut self.data[self.length..self.length + n])?;
        self.length += read;
        Ok(read)
    }

    /// 丢弃前 `n` 个字节，剩余数据移动到头部
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.length);
        if n == 0 {
            return;
        }
        self.data.copy_within(n..self.length, 0);
        let tail = self.length - n;
        self.data[tail..self.length].fill(0);
        self.length = tail;
    }

    /// 把已写入的数据保存到文件，空缓冲区拒绝写入且不创建文件
    pub fn flush_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if self.is_empty() {
            return Err(DemuxError::EmptyBuffer);
        }

        let mut file = File::create(path.as_ref())?;
        file.write_all(self.as_slice())?;
        file.flush()?;
        Ok(())
    }

    /// 释放存储，回到未分配状态
    pub fn release(&mut self) {
        self.data = Vec::new();
        self.length = 0;
    }
}
