//! JS probes evaluated inside the checked page. Each is a self-contained expression
//! returning a JSON-serializable value.

use crate::html;

pub const BODY_TEXT: &str = "(() => (document.body ? document.body.innerText || '' : ''))()";

pub const PAGE_MARKUP: &str =
    "(() => (document.documentElement ? document.documentElement.outerHTML : ''))()";

/// True when an anchor or clickable element offers to open the video on the platform.
pub const WATCH_REDIRECT: &str = r#"(() => {
  const toPlatform = (s) => /youtube(-nocookie)?\.com\/watch|youtu\.be\//i.test(s || '');
  const saysWatch = (s) => { const t = (s || '').toLowerCase(); return t.includes('watch') && t.includes('youtube'); };
  for (const a of document.querySelectorAll('a[href]')) {
    if (toPlatform(a.getAttribute('href')) || saysWatch(a.innerText) || saysWatch(a.getAttribute('aria-label'))) return true;
  }
  for (const el of document.querySelectorAll('button, [role="button"], [onclick]')) {
    if (saysWatch(el.innerText) || saysWatch(el.getAttribute('aria-label')) || saysWatch(el.getAttribute('title'))) return true;
  }
  return false;
})()"#;

pub const FRAME_SELECTOR: &str = "iframe";

pub const FRAME_INFO: &str = r#"(() => {
  const f = document.querySelector('iframe');
  return f ? { found: true, src: f.src || f.getAttribute('src') || '' } : { found: false, src: '' };
})()"#;

/// Any element suggesting a player is present, used to discount offline wording.
pub const PLAYER_PRESENT: &str = r#"(() => {
  if (document.querySelector('video, iframe')) return true;
  if (document.querySelector('[class*="player" i], [id*="player" i], [class*="video" i], [id*="video" i]')) return true;
  return Array.from(document.querySelectorAll('a[href]'))
    .some((a) => /youtube(-nocookie)?\.com\/watch|youtu\.be\//i.test(a.getAttribute('href') || ''));
})()"#;

pub const MEDIA_STATE: &str = r#"(() => {
  const v = document.querySelector('video');
  const hasFrame = !!document.querySelector('iframe');
  if (!v) return { hasVideo: false, hasFrame };
  const source = v.querySelector('source');
  return {
    hasVideo: true,
    hasFrame,
    readyState: v.readyState,
    networkState: v.networkState,
    src: v.currentSrc || v.getAttribute('src') || (source ? source.src : '') || '',
    error: v.error ? { code: v.error.code, message: v.error.message || '' } : null,
  };
})()"#;

pub const PLAYER_HINT: &str = r#"!!document.querySelector('[class*="player" i], [id*="player" i], [class*="video" i], [id*="video" i], [class*="media" i], [id*="media" i]')"#;

pub const PLAY_CONTROL: &str = r#"(() => Array.from(document.querySelectorAll('button, [role="button"], a, [aria-label]'))
  .some((el) => /\bplay\b/i.test((el.innerText || '') + ' ' + (el.getAttribute('aria-label') || ''))))()"#;

const AUDIO_ID: &str = "mediacheck-audio";

/// Ask the probe audio element to start loading its source.
pub const RADIO_START: &str = r#"(() => {
  const a = document.getElementById('mediacheck-audio');
  if (a) a.load();
  return !!a;
})()"#;

pub const RADIO_SETTLED: &str =
    "!!(window.checkResult && (window.checkResult.error || window.checkResult.loaded || window.checkResult.canPlay))";

pub const RADIO_STATE: &str = r#"(() => {
  const a = document.getElementById('mediacheck-audio');
  return Object.assign({}, window.checkResult || {}, { readyState: a ? a.readyState : 0 });
})()"#;

/// Minimal page hosting an audio element for `stream_url` whose events land in
/// `window.checkResult`.
pub fn radio_page(stream_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Radio Stream Check</title></head>
<body>
<audio id="{id}" controls preload="auto">
  <source src="{src}" type="audio/mpeg">
</audio>
<script>
  window.checkResult = {{}};
  const audio = document.getElementById('{id}');
  audio.addEventListener('error', function () {{
    window.checkResult.error = true;
    window.checkResult.errorMessage = 'Audio error: ' + (audio.error && audio.error.message ? audio.error.message : 'Unknown error');
  }}, true);
  audio.addEventListener('loadeddata', function () {{
    if (audio.readyState >= 2) {{ window.checkResult.loaded = true; }}
  }});
  audio.addEventListener('canplay', function () {{ window.checkResult.canPlay = true; }});
</script>
</body>
</html>"#,
        id = AUDIO_ID,
        src = html::escape(stream_url),
    )
}
