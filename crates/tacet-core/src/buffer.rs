//! Planar sample storage with a derived interleaved view.
//!
//! A [`SampleBuffer`] is a cheap handle over shared channel data: cloning it
//! (or passing it to several buffer-source nodes) references the same
//! samples. Channel count and length are fixed at construction; only sample
//! values mutate. The interleaved view is rebuilt lazily and invalidated by
//! every mutation through the buffer API.
//!
//! Engine registration snapshots the interleaved data at the first `start()`
//! of a buffer-source using the buffer; mutating channel data afterwards is
//! visible through this API but is not re-sent to the engine.

use std::sync::Arc;

use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ids::{BufferId, IdAllocator};
use crate::{Error, Result};

struct ChannelStore {
    channels: Vec<Vec<f32>>,
    /// Lazily rebuilt `frame * channel_count + channel` view. `None` = stale.
    interleaved: Option<Arc<Vec<f32>>>,
}

impl ChannelStore {
    fn rebuild(&mut self, frames: usize, channel_count: usize) -> Arc<Vec<f32>> {
        if let Some(cache) = &self.interleaved {
            return Arc::clone(cache);
        }
        let mut flat = vec![0.0f32; frames * channel_count];
        for (ch, data) in self.channels.iter().enumerate() {
            for (frame, &sample) in data.iter().enumerate() {
                flat[frame * channel_count + ch] = sample;
            }
        }
        let cache = Arc::new(flat);
        self.interleaved = Some(Arc::clone(&cache));
        cache
    }
}

/// Shared, fixed-shape planar sample container.
#[derive(Clone)]
pub struct SampleBuffer {
    id: BufferId,
    sample_rate: f64,
    length: usize,
    channel_count: usize,
    store: Arc<RwLock<ChannelStore>>,
}

impl SampleBuffer {
    pub(crate) fn allocate(
        ids: &IdAllocator,
        channel_count: usize,
        length: usize,
        sample_rate: f64,
    ) -> Result<Self> {
        if channel_count == 0 || channel_count > 32 {
            return Err(Error::validation(format!(
                "buffer channel count {channel_count} out of range (1-32)"
            )));
        }
        if length == 0 {
            return Err(Error::validation("buffer length must be at least 1 frame"));
        }
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(Error::validation(format!(
                "buffer sample rate {sample_rate} must be positive"
            )));
        }

        Ok(Self {
            id: ids.next_buffer_id(),
            sample_rate,
            length,
            channel_count,
            store: Arc::new(RwLock::new(ChannelStore {
                channels: vec![vec![0.0; length]; channel_count],
                interleaved: None,
            })),
        })
    }

    /// Build a buffer by de-interleaving decoder or render output.
    pub(crate) fn from_interleaved(
        ids: &IdAllocator,
        samples: &[f32],
        channel_count: usize,
        sample_rate: f64,
    ) -> Result<Self> {
        if channel_count == 0 {
            return Err(Error::validation("interleaved data needs at least 1 channel"));
        }
        let frames = samples.len() / channel_count;
        if frames == 0 {
            return Err(Error::validation(
                "interleaved data must contain at least one frame",
            ));
        }
        let buffer = Self::allocate(ids, channel_count, frames, sample_rate)?;
        {
            let mut store = buffer.store.write();
            for (ch, data) in store.channels.iter_mut().enumerate() {
                for (frame, slot) in data.iter_mut().enumerate().take(frames) {
                    *slot = samples[frame * channel_count + ch];
                }
            }
        }
        Ok(buffer)
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Length in frames.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn duration(&self) -> f64 {
        self.length as f64 / self.sample_rate
    }

    fn check_channel(&self, channel: usize) -> Result<()> {
        if channel >= self.channel_count {
            return Err(Error::validation(format!(
                "channel {channel} out of range (buffer has {} channels)",
                self.channel_count
            )));
        }
        Ok(())
    }

    /// Direct view of one channel's samples.
    pub fn channel_data(&self, channel: usize) -> Result<MappedRwLockReadGuard<'_, [f32]>> {
        self.check_channel(channel)?;
        Ok(RwLockReadGuard::map(self.store.read(), |s| {
            s.channels[channel].as_slice()
        }))
    }

    /// Direct mutable view of one channel's samples. Marks the interleaved
    /// view stale.
    pub fn channel_data_mut(&self, channel: usize) -> Result<MappedRwLockWriteGuard<'_, [f32]>> {
        self.check_channel(channel)?;
        let mut store = self.store.write();
        store.interleaved = None;
        Ok(RwLockWriteGuard::map(store, |s| {
            s.channels[channel].as_mut_slice()
        }))
    }

    /// Copy from a channel into `dest`, starting at `start_in_channel`.
    /// Returns the number of frames copied:
    /// `min(dest.len(), length - start_in_channel)`.
    pub fn copy_from_channel(
        &self,
        dest: &mut [f32],
        channel: usize,
        start_in_channel: usize,
    ) -> Result<usize> {
        self.check_channel(channel)?;
        if start_in_channel > self.length {
            return Err(Error::validation(format!(
                "start offset {start_in_channel} beyond buffer length {}",
                self.length
            )));
        }
        let store = self.store.read();
        let src = &store.channels[channel][start_in_channel..];
        let n = dest.len().min(src.len());
        dest[..n].copy_from_slice(&src[..n]);
        Ok(n)
    }

    /// Copy `src` into a channel, starting at `start_in_channel`. Marks the
    /// interleaved view stale. Returns the number of frames copied.
    pub fn copy_to_channel(
        &self,
        src: &[f32],
        channel: usize,
        start_in_channel: usize,
    ) -> Result<usize> {
        self.check_channel(channel)?;
        if start_in_channel > self.length {
            return Err(Error::validation(format!(
                "start offset {start_in_channel} beyond buffer length {}",
                self.length
            )));
        }
        let mut store = self.store.write();
        store.interleaved = None;
        let dest = &mut store.channels[channel][start_in_channel..];
        let n = src.len().min(dest.len());
        dest[..n].copy_from_slice(&src[..n]);
        Ok(n)
    }

    /// The flat `frame * channel_count + channel` view, rebuilt if stale.
    /// Used at the engine boundary.
    pub fn interleaved(&self) -> Arc<Vec<f32>> {
        if let Some(cache) = self.store.read().interleaved.clone() {
            return cache;
        }
        self.store.write().rebuild(self.length, self.channel_count)
    }

    /// Force an interleaved rebuild now instead of on next use.
    pub fn regenerate_interleaved(&self) {
        let mut store = self.store.write();
        store.interleaved = None;
        store.rebuild(self.length, self.channel_count);
    }
}

impl core::fmt::Debug for SampleBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("id", &self.id)
            .field("length", &self.length)
            .field("channel_count", &self.channel_count)
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}
