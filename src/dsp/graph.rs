//! Audio graph: transient source nodes scheduled on the context clock.
//!
//! Each node is one source (oscillator, noise buffer or decoded sample)
//! followed by an optional biquad filter, an automated gain stage and a
//! stereo panner. Nodes start and stop at absolute context times; once a
//! graph has been rendered nothing in it is reused.

use std::sync::Arc;

use super::filter::{BiquadFilter, FilterType};
use super::mixer::{Mixer, StereoBuffer};
use super::noise::NoiseBuffer;
use super::oscillator::{Oscillator, Waveform};
use super::param::AudioParam;
use super::sampler::SampleBuffer;

/// Frames rendered per block.
const BLOCK_SIZE: usize = 128;

/// Low-frequency oscillator added to an oscillator's frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lfo {
    pub waveform: Waveform,
    /// LFO rate in Hz.
    pub rate: f64,
    /// Peak frequency deviation in Hz.
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Oscillator {
        waveform: Waveform,
        frequency: AudioParam,
        lfo: Option<Lfo>,
    },
    Noise(NoiseBuffer),
    Buffer(Arc<SampleBuffer>),
}

/// A filter whose cutoff may be automated.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStage {
    pub filter_type: FilterType,
    pub frequency: AudioParam,
    pub q: f64,
}

impl FilterStage {
    pub fn new(filter_type: FilterType, frequency: f64) -> Self {
        FilterStage {
            filter_type,
            frequency: AudioParam::new(frequency),
            q: std::f64::consts::FRAC_1_SQRT_2,
        }
    }

    pub fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceNode {
    pub source: Source,
    pub gain: AudioParam,
    pub filter: Option<FilterStage>,
    /// Stereo position in [-1, 1].
    pub pan: f64,
    pub start: f64,
    pub stop: f64,
}

impl SourceNode {
    fn new(source: Source, start: f64, stop: f64) -> Self {
        SourceNode {
            source,
            gain: AudioParam::new(1.0),
            filter: None,
            pan: 0.0,
            start,
            stop: stop.max(start),
        }
    }

    pub fn oscillator(waveform: Waveform, frequency: f64, start: f64, stop: f64) -> Self {
        SourceNode::new(
            Source::Oscillator {
                waveform,
                frequency: AudioParam::new(frequency),
                lfo: None,
            },
            start,
            stop,
        )
    }

    pub fn noise(buffer: NoiseBuffer, start: f64, stop: f64) -> Self {
        SourceNode::new(Source::Noise(buffer), start, stop)
    }

    /// Plays `buffer` once from `start` to its end.
    pub fn buffer(buffer: Arc<SampleBuffer>, start: f64) -> Self {
        let stop = start + buffer.duration();
        SourceNode::new(Source::Buffer(buffer), start, stop)
    }

    pub fn with_gain(mut self, gain: AudioParam) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_filter(mut self, filter: FilterStage) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_pan(mut self, pan: f64) -> Self {
        self.pan = pan.clamp(-1.0, 1.0);
        self
    }

    /// Attach a pitch LFO. Ignored for non-oscillator sources.
    pub fn with_lfo(mut self, lfo: Lfo) -> Self {
        if let Source::Oscillator { lfo: slot, .. } = &mut self.source {
            *slot = Some(lfo);
        }
        self
    }

    /// The frequency parameter of an oscillator source.
    pub fn frequency(&self) -> Option<&AudioParam> {
        match &self.source {
            Source::Oscillator { frequency, .. } => Some(frequency),
            _ => None,
        }
    }

    pub fn frequency_mut(&mut self) -> Option<&mut AudioParam> {
        match &mut self.source {
            Source::Oscillator { frequency, .. } => Some(frequency),
            _ => None,
        }
    }

    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }
}

/// A set of nodes that play together, e.g. one effect invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioGraph {
    label: String,
    nodes: Vec<SourceNode>,
}

impl AudioGraph {
    pub fn new(label: impl Into<String>) -> Self {
        AudioGraph {
            label: label.into(),
            nodes: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn push(&mut self, node: SourceNode) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn nodes(&self) -> &[SourceNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Earliest node start, or 0 for an empty graph.
    pub fn start_time(&self) -> f64 {
        self.nodes
            .iter()
            .map(|n| n.start)
            .min_by(f64::total_cmp)
            .unwrap_or(0.0)
    }

    /// Latest node stop, or the start time for an empty graph.
    pub fn end_time(&self) -> f64 {
        self.nodes
            .iter()
            .map(|n| n.stop)
            .max_by(f64::total_cmp)
            .unwrap_or_else(|| self.start_time())
    }

    /// Render from [`AudioGraph::start_time`] until every node has stopped.
    pub fn render(&self, sample_rate: u32, master_gain: f64) -> StereoBuffer {
        let sr = sample_rate as f64;
        let origin = self.start_time();
        let total_frames = ((self.end_time() - origin) * sr).round().max(0.0) as usize;

        let mut scheduled: Vec<&SourceNode> = self.nodes.iter().collect();
        scheduled.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut out = StereoBuffer::silent(0, sample_rate);
        out.left.reserve(total_frames);
        out.right.reserve(total_frames);

        let mut mixer = Mixer::new(master_gain);
        let mut voices: Vec<NodeVoice> = Vec::new();
        let mut next_node = 0;
        let mut block_start = 0;

        while block_start < total_frames {
            let block_end = (block_start + BLOCK_SIZE).min(total_frames);

            while next_node < scheduled.len() {
                let node = scheduled[next_node];
                if frame_at(node.start, origin, sr, total_frames) >= block_end {
                    break;
                }
                voices.push(NodeVoice::new(node, origin, sr, total_frames));
                next_node += 1;
            }

            mixer.clear(block_end - block_start);
            for voice in voices.iter_mut() {
                for frame in block_start.max(voice.start_frame)..block_end.min(voice.stop_frame) {
                    let t = origin + frame as f64 / sr;
                    let sample = voice.next_sample(t);
                    mixer.add(frame - block_start, sample, voice.node.pan);
                }
            }
            mixer.drain_into(&mut out);

            voices.retain(|v| v.stop_frame > block_end);
            block_start = block_end;
        }

        log::debug!(
            "rendered '{}': {} nodes, {} frames @ {} Hz",
            self.label,
            self.nodes.len(),
            out.frames(),
            sample_rate
        );
        out
    }
}

/// Frame index of context time `t` within a render starting at `origin`.
fn frame_at(t: f64, origin: f64, sample_rate: f64, total_frames: usize) -> usize {
    (((t - origin) * sample_rate).round().max(0.0) as usize).min(total_frames)
}

/// Per-render state for one node.
struct NodeVoice<'a> {
    node: &'a SourceNode,
    oscillator: Option<Oscillator>,
    lfo: Option<Oscillator>,
    filter: Option<BiquadFilter>,
    start_frame: usize,
    stop_frame: usize,
    played: usize,
    sample_rate: f64,
}

impl<'a> NodeVoice<'a> {
    fn new(node: &'a SourceNode, origin: f64, sample_rate: f64, total_frames: usize) -> Self {
        let to_frame = |t: f64| frame_at(t, origin, sample_rate, total_frames);

        let (oscillator, lfo) = match &node.source {
            Source::Oscillator { waveform, lfo, .. } => (
                Some(Oscillator::new(*waveform, sample_rate)),
                lfo.map(|l| Oscillator::new(l.waveform, sample_rate)),
            ),
            _ => (None, None),
        };
        let filter = node.filter.as_ref().map(|stage| {
            BiquadFilter::new(
                stage.filter_type,
                stage.frequency.value_at(node.start),
                stage.q,
                sample_rate,
            )
        });

        NodeVoice {
            node,
            oscillator,
            lfo,
            filter,
            start_frame: to_frame(node.start),
            stop_frame: to_frame(node.stop),
            played: 0,
            sample_rate,
        }
    }

    fn next_sample(&mut self, t: f64) -> f64 {
        let node = self.node;
        let raw = match &node.source {
            Source::Oscillator { frequency, lfo, .. } => {
                let mut freq = frequency.value_at(t);
                if let (Some(cfg), Some(lfo_osc)) = (lfo, self.lfo.as_mut()) {
                    freq += lfo_osc.next_sample(cfg.rate) * cfg.depth;
                }
                self.oscillator
                    .as_mut()
                    .map_or(0.0, |osc| osc.next_sample(freq.max(0.0)))
            }
            Source::Noise(buffer) => buffer.sample(self.played),
            Source::Buffer(buffer) => buffer.sample_at(self.played as f64 / self.sample_rate),
        };
        self.played += 1;

        let filtered = match (&node.filter, self.filter.as_mut()) {
            (Some(stage), Some(filter)) => {
                if !stage.frequency.is_constant() {
                    filter.set_frequency(stage.frequency.value_at(t));
                }
                filter.process(raw)
            }
            _ => raw,
        };

        filtered * node.gain.value_at(t)
    }
}
