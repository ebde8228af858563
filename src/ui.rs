//! Static pages and the client script shared by both of them.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="fr">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Prendre rendez-vous</title>
  <style>
    :root {
      --bg: #f1f5f9;
      --card: #ffffff;
      --ink: #1e293b;
      --text-light: #64748b;
      --primary: #1d4ed8;
      --danger: #dc2626;
      --shadow: 0 20px 50px rgba(30, 41, 59, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(160deg, var(--bg), #dbeafe);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 16px;
    }

    main {
      width: min(640px, 100%);
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      padding: 32px;
    }

    h1 {
      margin: 0 0 6px;
      font-size: 1.8rem;
    }

    .subtitle {
      margin: 0 0 24px;
      color: var(--text-light);
    }

    .form-group {
      display: grid;
      gap: 6px;
      margin-bottom: 16px;
    }

    label {
      font-weight: 600;
      font-size: 0.95rem;
    }

    input, select, textarea {
      font: inherit;
      padding: 10px 12px;
      border: 1px solid #cbd5e1;
      border-radius: 10px;
    }

    textarea {
      min-height: 120px;
      resize: vertical;
    }

    .error-message {
      display: none;
      color: var(--danger);
      font-size: 0.85rem;
    }

    .form-group.error input,
    .form-group.error select,
    .form-group.error textarea {
      border-color: var(--danger);
    }

    .form-group.error .error-message {
      display: block;
    }

    button {
      width: 100%;
      border: none;
      border-radius: 999px;
      padding: 14px;
      font: inherit;
      font-weight: 600;
      color: #fff;
      background: var(--primary);
      cursor: pointer;
    }

    button:disabled {
      opacity: 0.6;
      cursor: wait;
    }
  </style>
</head>
<body>
  <main>
    <h1>Prendre rendez-vous</h1>
    <p class="subtitle">Déposez votre demande, un conseiller vous recontacte.</p>
    <form id="contactForm" novalidate>
      <div class="form-group">
        <label for="nom">Nom complet *</label>
        <input id="nom" name="nom" type="text" />
        <span class="error-message"></span>
      </div>
      <div class="form-group">
        <label for="email">Email *</label>
        <input id="email" name="email" type="email" />
        <span class="error-message"></span>
      </div>
      <div class="form-group">
        <label for="telephone">Téléphone</label>
        <input id="telephone" name="telephone" type="tel" placeholder="06 12 34 56 78" />
        <span class="error-message"></span>
      </div>
      <div class="form-group">
        <label for="service">Service *</label>
        <select id="service" name="service">
          <option value="">-- Choisir un service --</option>
          <option value="CAF">CAF</option>
          <option value="CPAM">Assurance maladie</option>
          <option value="ANTS">Carte grise / permis</option>
          <option value="Impots">Impôts</option>
          <option value="Retraite">Retraite</option>
          <option value="Urbanisme">Urbanisme</option>
          <option value="Autre">Autre</option>
        </select>
        <span class="error-message"></span>
      </div>
      <div class="form-group">
        <label for="sujet">Sujet *</label>
        <input id="sujet" name="sujet" type="text" />
        <span class="error-message"></span>
      </div>
      <div class="form-group">
        <label for="message">Message *</label>
        <textarea id="message" name="message"></textarea>
        <span class="error-message"></span>
      </div>
      <button type="submit">Envoyer la demande</button>
    </form>
  </main>
  <script src="/app.js"></script>
</body>
</html>
"#;

pub const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="fr">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Tableau de bord des demandes</title>
  <style>
    :root {
      --bg: #f8fafc;
      --card: #ffffff;
      --ink: #0f172a;
      --text-light: #64748b;
      --primary: #1d4ed8;
      --danger: #dc2626;
      --ok: #16a34a;
      --muted: #94a3b8;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
      padding: 24px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: center;
      gap: 16px;
      margin-bottom: 20px;
    }

    h1 {
      margin: 0;
    }

    .cards {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 12px;
      margin-bottom: 20px;
    }

    .card {
      background: var(--card);
      border-radius: 14px;
      padding: 14px 16px;
      box-shadow: 0 8px 24px rgba(15, 23, 42, 0.06);
    }

    .card .label {
      color: var(--text-light);
      font-size: 0.85rem;
    }

    .card .value {
      font-size: 1.6rem;
      font-weight: 700;
    }

    .toolbar {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      margin-bottom: 16px;
    }

    .toolbar input, .toolbar select {
      font: inherit;
      padding: 8px 10px;
      border: 1px solid #cbd5e1;
      border-radius: 8px;
    }

    .toolbar input {
      flex: 1 1 240px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      background: var(--card);
      border-radius: 14px;
      overflow: hidden;
    }

    th, td {
      text-align: left;
      padding: 12px;
      border-bottom: 1px solid #e2e8f0;
      vertical-align: top;
    }

    th {
      background: #eff6ff;
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.04em;
    }

    .badge {
      display: inline-block;
      padding: 3px 10px;
      border-radius: 999px;
      font-size: 0.8rem;
      font-weight: 600;
      color: #fff;
    }

    .badge-Nouveau { background: var(--primary); }
    .badge-Traitee { background: var(--ok); }
    .badge-Archivee { background: var(--muted); }

    .priority-select {
      font: inherit;
      border-radius: 8px;
      padding: 4px 6px;
    }

    .prio-Haute { color: var(--danger); font-weight: 700; }
    .prio-Moyenne { color: #d97706; }
    .prio-Basse { color: var(--text-light); }

    .action-button {
      display: block;
      width: 100%;
      border: none;
      border-radius: 8px;
      padding: 6px 10px;
      color: #fff;
      background: var(--primary);
      cursor: pointer;
      font: inherit;
      font-size: 0.85rem;
    }

    .delete-button {
      background: var(--danger);
      margin-top: 8px;
    }

    #loading {
      padding: 20px;
      color: var(--text-light);
    }
  </style>
</head>
<body>
  <header>
    <h1>Demandes reçues</h1>
    <button class="action-button" style="width:auto" onclick="exportCSV()">Exporter en CSV</button>
  </header>

  <section class="cards">
    <div class="card"><div class="label">Vues du formulaire</div><div class="value" id="stat-views">-</div></div>
    <div class="card"><div class="label">Visiteurs uniques</div><div class="value" id="stat-ips">-</div></div>
    <div class="card"><div class="label">Demandes affichées</div><div class="value" id="count-total">-</div></div>
    <div class="card"><div class="label">Nouvelles</div><div class="value" id="count-new">-</div></div>
    <div class="card"><div class="label">Traitées</div><div class="value" id="count-done">-</div></div>
  </section>

  <section class="toolbar">
    <input id="searchInput" type="search" placeholder="Rechercher (nom, email, sujet, service, message)" />
    <select id="statusFilter">
      <option value="all">Tous les statuts</option>
      <option value="Nouveau">Nouveau</option>
      <option value="Traitée">Traitée</option>
      <option value="Archivée">Archivée</option>
    </select>
    <select id="priorityFilter">
      <option value="all">Toutes priorités</option>
      <option value="Haute">Haute</option>
      <option value="Moyenne">Moyenne</option>
      <option value="Basse">Basse</option>
    </select>
  </section>

  <div id="loading">Chargement des données...</div>
  <table id="dataTable" style="display:none">
    <thead>
      <tr>
        <th>Date</th>
        <th>Nom</th>
        <th>Contact</th>
        <th>Demande</th>
        <th>Priorité</th>
        <th>Statut</th>
        <th>Actions</th>
      </tr>
    </thead>
    <tbody id="tableBody"></tbody>
  </table>
  <script src="/app.js"></script>
</body>
</html>
"#;

pub const APP_JS: &str = r#"// Dashboard controller (dashboard.html)

const NEXT_STATUS = {
  'Nouveau': { target: 'Traitée', label: 'Marquer traitée' },
  'Traitée': { target: 'Archivée', label: 'Archiver' },
  'Archivée': { target: 'Nouveau', label: 'Ré-ouvrir' }
};

const PRIORITIES = ['Haute', 'Moyenne', 'Basse'];

const escapeHtml = (value) => String(value ?? '')
  .replace(/&/g, '&amp;')
  .replace(/</g, '&lt;')
  .replace(/>/g, '&gt;')
  .replace(/"/g, '&quot;')
  .replace(/'/g, '&#39;');

const cssToken = (value) => String(value).normalize('NFD').replace(/[^a-zA-Z]/g, '');

async function fetchStats() {
  try {
    const response = await fetch('/api/stats');
    const stats = await response.json();
    document.getElementById('stat-views').innerText = stats.totalViews;
    document.getElementById('stat-ips').innerText = stats.uniqueIps;
  } catch (error) {
    console.error('stats unavailable', error);
  }
}

function matchesFilters(row, search, status, priority) {
  if (status !== 'all' && row.statut !== status) {
    return false;
  }
  if (priority !== 'all' && row.priorite !== priority) {
    return false;
  }
  if (!search) {
    return true;
  }
  return [row.nom, row.email, row.sujet, row.service, row.message]
    .some((field) => String(field).toLowerCase().includes(search));
}

function renderRow(row) {
  const tr = document.createElement('tr');
  const id = escapeHtml(row.id);
  const next = NEXT_STATUS[row.statut];

  let actions = '';
  if (next) {
    actions += `<button class="action-button" onclick="updateStatus('${id}', '${next.target}')">${next.label}</button>`;
  }
  actions += `<button class="action-button delete-button" onclick="deleteRequest('${id}')">Supprimer</button>`;

  const options = PRIORITIES
    .map((p) => `<option value="${p}" ${row.priorite === p ? 'selected' : ''} class="prio-${p}">${p}</option>`)
    .join('');

  const processed = row.statut === 'Traitée' && row.date_traitement
    ? `<div style="font-size:0.75rem; color:var(--text-light); margin-top:5px;">(Traité le ${escapeHtml(row.date_traitement)})</div>`
    : '';

  tr.innerHTML = `
    <td style="color: var(--text-light); font-size: 0.9rem;">${escapeHtml(row.date)}</td>
    <td style="font-weight: 600;">${escapeHtml(row.nom)}</td>
    <td style="font-size: 0.9rem;">
      <div><a href="mailto:${escapeHtml(row.email)}">${escapeHtml(row.email)}</a></div>
      <div>${escapeHtml(row.telephone)}</div>
    </td>
    <td>
      <div style="font-weight:600; color:var(--primary);">${escapeHtml(row.service)} - ${escapeHtml(row.sujet)}</div>
      <div style="color:#475569; font-size:0.9rem;">${escapeHtml(row.message)}</div>
    </td>
    <td><select class="priority-select prio-${cssToken(row.priorite)}" onchange="updatePriority('${id}', this.value)">${options}</select></td>
    <td><span class="badge badge-${cssToken(row.statut)}">${escapeHtml(row.statut)}</span>${processed}</td>
    <td>${actions}</td>
  `;
  return tr;
}

async function fetchData() {
  const table = document.getElementById('dataTable');
  const loading = document.getElementById('loading');
  const tbody = document.getElementById('tableBody');
  const search = document.getElementById('searchInput').value.trim().toLowerCase();
  const status = document.getElementById('statusFilter').value;
  const priority = document.getElementById('priorityFilter').value;

  fetchStats();

  loading.innerText = 'Chargement des données...';
  loading.style.color = '';
  loading.style.display = 'block';
  table.style.display = 'none';

  try {
    const response = await fetch('/api/data');
    if (!response.ok) {
      throw new Error(`HTTP ${response.status}`);
    }
    const data = (await response.json()).filter((row) => matchesFilters(row, search, status, priority));

    document.getElementById('count-total').innerText = data.length;
    document.getElementById('count-new').innerText = data.filter((row) => row.statut === 'Nouveau').length;
    document.getElementById('count-done').innerText = data.filter((row) => row.statut === 'Traitée').length;

    tbody.innerHTML = '';
    if (data.length === 0) {
      loading.innerText = 'Aucune demande trouvée avec ces filtres.';
      return;
    }

    data.forEach((row) => tbody.appendChild(renderRow(row)));
    loading.style.display = 'none';
    table.style.display = 'table';
  } catch (error) {
    console.error('data unavailable', error);
    loading.innerText = 'Erreur de chargement. Vérifiez le serveur et le format des données.';
    loading.style.color = 'red';
  }
}

async function postJson(url, body) {
  const response = await fetch(url, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body)
  });
  const result = await response.json();
  if (!response.ok || !result.success) {
    throw new Error(result.error || 'Erreur inconnue.');
  }
  return result;
}

async function updateStatus(id, statut) {
  if (!confirm(`Confirmez-vous le changement de statut de la demande ${id} à "${statut}" ?`)) {
    return;
  }
  try {
    await postJson('/api/update-status', { id, statut });
    fetchData();
  } catch (error) {
    alert('Échec de la mise à jour du statut : ' + error.message);
  }
}

async function updatePriority(id, priorite) {
  try {
    await postJson('/api/update-priority', { id, priorite });
    fetchData();
  } catch (error) {
    alert('Échec de la mise à jour de la priorité : ' + error.message);
  }
}

async function deleteRequest(id) {
  if (!confirm(`Confirmez-vous la suppression DÉFINITIVE de la demande ${id} ?`)) {
    return;
  }
  try {
    await postJson('/api/delete-request', { id });
    alert('Suppression réussie.');
    fetchData();
  } catch (error) {
    alert('Échec de la suppression : ' + error.message);
  }
}

function exportCSV() {
  window.location.href = '/api/export-csv';
}

// Form controller (index.html)

const PHONE_PATTERN = /^(?:(?:\+|00)33|0)\s*[1-9](?:[\s.-]*\d{2}){4}$/;
const EMAIL_PATTERN = /^\S+@\S+\.\S+$/;
const REQUIRED_FIELDS = ['nom', 'email', 'sujet', 'service', 'message'];

function setFieldError(input, message) {
  const group = input.closest('.form-group');
  const slot = group.querySelector('.error-message');
  if (message) {
    group.classList.add('error');
    slot.innerText = message;
  } else {
    group.classList.remove('error');
    slot.innerText = '';
  }
}

function validateForm() {
  let valid = true;

  REQUIRED_FIELDS.forEach((id) => {
    const input = document.getElementById(id);
    const value = input.value.trim();
    let message = '';
    if (!value) {
      message = 'Ce champ est obligatoire.';
    } else if (id === 'email' && !EMAIL_PATTERN.test(value)) {
      message = 'Format Email invalide.';
    }
    setFieldError(input, message);
    valid = valid && !message;
  });

  const phone = document.getElementById('telephone');
  const phoneValue = phone.value.trim();
  if (phoneValue !== '' && !PHONE_PATTERN.test(phoneValue)) {
    setFieldError(phone, 'Numéro de téléphone invalide (format attendu : 0X XX XX XX XX).');
    valid = false;
  } else {
    setFieldError(phone, '');
  }

  return valid;
}

async function submitForm(event) {
  event.preventDefault();
  const form = event.currentTarget;

  if (!validateForm()) {
    alert('Veuillez corriger les erreurs dans le formulaire.');
    return;
  }

  const button = form.querySelector('button');
  const label = button.innerText;
  button.innerText = 'Envoi en cours...';
  button.disabled = true;

  const payload = {};
  ['nom', 'email', 'telephone', 'sujet', 'service', 'message'].forEach((id) => {
    payload[id] = document.getElementById(id).value;
  });

  try {
    await postJson('/api/submit', payload);
    alert('Votre demande a bien été enregistrée !');
    form.reset();
  } catch (error) {
    alert('Erreur serveur : ' + error.message);
  } finally {
    button.innerText = label;
    button.disabled = false;
  }
}

document.addEventListener('DOMContentLoaded', () => {
  if (document.getElementById('dataTable')) {
    fetchData();
    document.getElementById('searchInput').addEventListener('input', fetchData);
    document.getElementById('statusFilter').addEventListener('change', fetchData);
    document.getElementById('priorityFilter').addEventListener('change', fetchData);
  }

  const contactForm = document.getElementById('contactForm');
  if (contactForm) {
    contactForm.addEventListener('submit', submitForm);
  }
});
"#;
